use crate::page::{Page, Section};

/// Highlights the navigation link of the section currently in view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollSpy {
    bias: f64,
}

impl ScrollSpy {
    /// Roughly the height of a fixed page header.
    pub const DEFAULT_BIAS: f64 = 100.0;

    pub fn new(bias: f64) -> Self {
        Self { bias }
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// The document position tested against sections for a given scroll offset.
    pub fn reference_point(&self, scroll_offset: f64) -> f64 {
        scroll_offset + self.bias
    }

    /// Find the section containing the reference point for a scroll offset.
    ///
    /// Sections are not expected to overlap. If they do, the last match in document order wins.
    pub fn active_section<'a>(&self, sections: &'a [Section], scroll_offset: f64) -> Option<&'a Section> {
        let reference = self.reference_point(scroll_offset);
        let mut active = None;
        for section in sections {
            if section.contains(reference) {
                active = Some(section);
            }
        }
        active
    }

    /// Recompute the active section from the page's current state and mark its links.
    ///
    /// Every link ends up active if and only if it targets the active section, so when nothing
    /// matches all links are cleared. Returns the id of the active section.
    pub fn highlight(&self, page: &mut dyn Page) -> Option<String> {
        let sections = page.sections();
        let active = self.active_section(&sections, page.scroll_offset()).map(|section| section.id.clone());
        for (index, link) in page.nav_links().into_iter().enumerate() {
            let is_active = active.is_some() && link.target() == active.as_deref();
            page.set_link_active(index, is_active);
        }
        active
    }
}

impl Default for ScrollSpy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BIAS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{PageLayout, StaticPage};
    use rstest::rstest;

    fn two_sections() -> Vec<Section> {
        vec![Section::new("a", 0.0, 100.0), Section::new("b", 100.0, 100.0)]
    }

    fn page(sections: Vec<Section>, links: &[&str]) -> StaticPage {
        let layout = PageLayout {
            elements: vec![],
            sections,
            links: links.iter().map(|link| link.to_string()).collect(),
            viewport_height: 100.0,
        };
        StaticPage::new(&layout)
    }

    #[test]
    fn large_offsets_keep_precision() {
        let spy = ScrollSpy::new(0.0);
        let sections = vec![Section::new("a", 16_777_216.0, 1.0), Section::new("b", 16_777_217.0, 1.0)];
        let active = spy.active_section(&sections, 16_777_217.0).map(|section| section.id.as_str());
        assert_eq!(active, Some("b"));
    }

    #[rstest]
    #[case::top_of_page(0.0, Some("b"))]
    #[case::overscrolled(-50.0, Some("a"))]
    #[case::inside_second(50.0, Some("b"))]
    #[case::past_the_end(100.0, None)]
    #[case::far_above(-200.0, None)]
    fn active_section(#[case] offset: f64, #[case] expected: Option<&str>) {
        let spy = ScrollSpy::new(100.0);
        let sections = two_sections();
        let active = spy.active_section(&sections, offset).map(|section| section.id.as_str());
        assert_eq!(active, expected);
    }

    #[test]
    fn overlapping_sections_last_match_wins() {
        let spy = ScrollSpy::new(0.0);
        let sections = vec![Section::new("a", 0.0, 200.0), Section::new("b", 100.0, 200.0)];
        let active = spy.active_section(&sections, 150.0).map(|section| section.id.as_str());
        assert_eq!(active, Some("b"));
    }

    #[test]
    fn gaps_match_nothing() {
        let spy = ScrollSpy::new(0.0);
        let sections = vec![Section::new("a", 0.0, 100.0), Section::new("b", 200.0, 100.0)];
        assert!(spy.active_section(&sections, 150.0).is_none());
    }

    #[test]
    fn highlight_marks_matching_link() {
        let mut page = page(two_sections(), &["#a", "#b", "https://example.com"]);
        let spy = ScrollSpy::new(100.0);

        assert_eq!(spy.highlight(&mut page).as_deref(), Some("b"));
        assert_eq!(page.active_link(), Some("#b"));

        page.scroll_to(-50.0);
        assert_eq!(spy.highlight(&mut page).as_deref(), Some("a"));
        let active: Vec<_> = page.links().iter().map(|link| link.active).collect();
        assert_eq!(active, &[true, false, false]);
    }

    #[test]
    fn highlight_is_idempotent() {
        let mut page = page(two_sections(), &["#a", "#b"]);
        let spy = ScrollSpy::default();
        let first = spy.highlight(&mut page);
        let links = page.links().to_vec();
        let second = spy.highlight(&mut page);
        assert_eq!(first, second);
        assert_eq!(page.links(), links.as_slice());
    }

    #[test]
    fn no_match_clears_links() {
        let mut page = page(two_sections(), &["#a", "#b"]);
        let spy = ScrollSpy::default();
        spy.highlight(&mut page);
        assert!(page.active_link().is_some());

        page.scroll_to(5000.0);
        assert_eq!(spy.highlight(&mut page), None);
        assert_eq!(page.active_link(), None);
    }

    #[test]
    fn empty_page_is_noop() {
        let mut page = page(vec![], &[]);
        assert_eq!(ScrollSpy::default().highlight(&mut page), None);
    }
}
