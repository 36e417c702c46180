use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A vertical slice of the page that a navigation link can point at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
pub struct Section {
    /// The section's element id, matched against link fragments.
    pub id: String,

    /// Offset of the section's top edge from the top of the document.
    pub top: f64,

    /// The section's height.
    pub height: f64,
}

impl Section {
    pub fn new<S: Into<String>>(id: S, top: f64, height: f64) -> Self {
        Self { id: id.into(), top, height }
    }

    /// Whether a document position falls within this section.
    ///
    /// The top edge is inclusive and the bottom edge exclusive.
    pub fn contains(&self, position: f64) -> bool {
        self.top <= position && position < self.top + self.height
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Whether some document position falls within both sections.
    pub fn overlaps(&self, other: &Section) -> bool {
        self.top < other.bottom() && other.top < self.bottom()
    }
}

/// A navigation link and its active marker.
#[derive(Clone, Debug, PartialEq)]
pub struct NavLink {
    /// The link's target, e.g. `#about`.
    pub href: String,

    /// Whether the link is currently marked as active.
    pub active: bool,
}

impl NavLink {
    pub fn new<S: Into<String>>(href: S) -> Self {
        Self { href: href.into(), active: false }
    }

    /// The fragment this link points to, without the leading `#`.
    ///
    /// Links that aren't in-page fragments have no target.
    pub fn target(&self) -> Option<&str> {
        self.href.strip_prefix('#').filter(|fragment| !fragment.is_empty())
    }
}

/// The page the effects operate on.
///
/// This is the only way effects observe or mutate the outside world. Elements are addressed by
/// id, and a missing element is never an error: setters on unknown ids do nothing.
pub trait Page {
    /// Whether an element with the given id exists.
    fn has_element(&self, id: &str) -> bool;

    /// Replace the text content of an element.
    fn set_text(&mut self, id: &str, text: &str);

    /// Show or hide an element.
    fn set_visible(&mut self, id: &str, visible: bool);

    /// The page sections, in document order.
    fn sections(&self) -> Vec<Section>;

    /// The navigation links, in document order.
    fn nav_links(&self) -> Vec<NavLink>;

    /// Set or clear the active marker on the link at the given position.
    fn set_link_active(&mut self, index: usize, active: bool);

    /// The current vertical scroll offset.
    fn scroll_offset(&self) -> f64;
}

/// The static description of a page: which elements, sections and links it has.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(default, deny_unknown_fields)]
pub struct PageLayout {
    /// The ids of the elements present on the page.
    pub elements: Vec<String>,

    /// The sections, in document order.
    pub sections: Vec<Section>,

    /// The navigation link targets, in document order.
    pub links: Vec<String>,

    /// The height of the visible area.
    pub viewport_height: f64,
}

impl PageLayout {
    /// The furthest the page can be scrolled down.
    pub fn max_scroll(&self) -> f64 {
        let bottom = self.sections.iter().map(Section::bottom).fold(0.0, f64::max);
        (bottom - self.viewport_height).max(0.0)
    }

    /// Every pair of overlapping sections, in document order.
    pub fn overlapping_sections(&self) -> Vec<(&Section, &Section)> {
        self.sections.iter().tuple_combinations().filter(|(first, second)| first.overlaps(second)).collect()
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        let ids = ["home", "about", "courses", "contact"];
        let sections = ids.iter().enumerate().map(|(index, id)| Section::new(*id, index as f64 * 600.0, 600.0)).collect();
        Self {
            elements: vec!["typed-text".into(), "cursor".into()],
            sections,
            links: ids.iter().map(|id| format!("#{id}")).collect(),
            viewport_height: 600.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub text: String,
    pub visible: bool,
}

/// An in-memory page built from a [PageLayout].
#[derive(Clone, Debug, PartialEq)]
pub struct StaticPage {
    elements: BTreeMap<String, Element>,
    sections: Vec<Section>,
    links: Vec<NavLink>,
    scroll_offset: f64,
}

impl StaticPage {
    pub fn new(layout: &PageLayout) -> Self {
        let elements = layout.elements.iter().map(|id| (id.clone(), Element { text: String::new(), visible: true })).collect();
        Self {
            elements,
            sections: layout.sections.clone(),
            links: layout.links.iter().map(NavLink::new).collect(),
            scroll_offset: 0.0,
        }
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    /// The text of an element, or `None` if there's no such element.
    pub fn text(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(|element| element.text.as_str())
    }

    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    /// The target of the link currently marked active, if any.
    pub fn active_link(&self) -> Option<&str> {
        self.links.iter().find(|link| link.active).map(|link| link.href.as_str())
    }

    pub fn scroll_to(&mut self, offset: f64) {
        self.scroll_offset = offset;
    }
}

impl Page for StaticPage {
    fn has_element(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    fn set_text(&mut self, id: &str, text: &str) {
        if let Some(element) = self.elements.get_mut(id) {
            element.text.clear();
            element.text.push_str(text);
        }
    }

    fn set_visible(&mut self, id: &str, visible: bool) {
        if let Some(element) = self.elements.get_mut(id) {
            element.visible = visible;
        }
    }

    fn sections(&self) -> Vec<Section> {
        self.sections.clone()
    }

    fn nav_links(&self) -> Vec<NavLink> {
        self.links.clone()
    }

    fn set_link_active(&mut self, index: usize, active: bool) {
        if let Some(link) = self.links.get_mut(index) {
            link.active = active;
        }
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::top_edge(0.0, true)]
    #[case::inside(99.9, true)]
    #[case::bottom_edge(100.0, false)]
    #[case::above(-1.0, false)]
    fn section_contains(#[case] position: f64, #[case] expected: bool) {
        let section = Section::new("a", 0.0, 100.0);
        assert_eq!(section.contains(position), expected);
    }

    #[rstest]
    #[case("#about", Some("about"))]
    #[case("#", None)]
    #[case("https://example.com", None)]
    fn link_target(#[case] href: &str, #[case] expected: Option<&str>) {
        assert_eq!(NavLink::new(href).target(), expected);
    }

    #[test]
    fn unknown_elements_are_ignored() {
        let mut page = StaticPage::new(&PageLayout::default());
        page.set_text("nope", "hello");
        page.set_visible("nope", false);
        page.set_link_active(42, true);
        assert!(!page.has_element("nope"));
        assert_eq!(page.active_link(), None);
    }

    #[test]
    fn set_text_replaces_content() {
        let mut page = StaticPage::new(&PageLayout::default());
        page.set_text("typed-text", "Hello");
        page.set_text("typed-text", "He");
        assert_eq!(page.text("typed-text"), Some("He"));
    }

    #[test]
    fn overlaps_found_between_any_sections() {
        let layout = PageLayout {
            sections: vec![
                Section::new("a", 0.0, 1000.0),
                Section::new("b", 1000.0, 100.0),
                Section::new("c", 500.0, 100.0),
                Section::new("d", 2000.0, 100.0),
            ],
            ..PageLayout::default()
        };
        let overlaps: Vec<_> =
            layout.overlapping_sections().into_iter().map(|(first, second)| (first.id.as_str(), second.id.as_str())).collect();
        assert_eq!(overlaps, &[("a", "c")]);
    }

    #[test]
    fn default_layout_has_no_overlaps() {
        assert!(PageLayout::default().overlapping_sections().is_empty());
    }

    #[test]
    fn default_layout_max_scroll() {
        let layout = PageLayout::default();
        assert_eq!(layout.max_scroll(), 1800.0);
    }
}
