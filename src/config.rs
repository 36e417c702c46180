use crate::{
    effects::{BlinkStart, ScrollSpy, TypingMode, TypingTimings},
    page::PageLayout,
};
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

/// The phrases cycled through when none are configured.
const DEFAULT_PHRASES: &[&str] = &[
    "Mathematics Meets Trading",
    "Free Chart Education",
    "Proprietary Quant Code",
    "Smart Money Concepts",
    "Systematic Trading Academy",
    "Eradicating Forex Scams",
];

/// Everything needed to run the effects on a page.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// The typing animation.
    pub typing: TypingConfig,

    /// The navigation highlighter.
    pub scroll_spy: ScrollSpyConfig,

    /// The page the effects run on.
    pub page: PageLayout,
}

impl SiteConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io { path: path.into(), source: e })?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate a config from its YAML contents.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// The per-user config file location, e.g. `~/.config/pagefx/config.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "pagefx")?;
        Some(dirs.config_dir().join("config.yaml"))
    }

    /// The JSON schema of the config file.
    #[cfg(feature = "json-schema")]
    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SiteConfig)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.typing.validate()?;
        self.scroll_spy.validate()?;
        for (first, second) in self.page.overlapping_sections() {
            tracing::warn!("sections '{}' and '{}' overlap, the latter wins when both match", first.id, second.id);
        }
        Ok(())
    }
}

/// The typing animation's configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(default, deny_unknown_fields)]
pub struct TypingConfig {
    /// The phrases to type, in order.
    pub phrases: Vec<String>,

    /// Whether to cycle forever or type each phrase once.
    pub mode: TypingMode,

    /// The element the phrases are typed into when cycling.
    pub target: String,

    /// The elements each phrase is typed into when typing once, one per phrase.
    pub line_targets: Vec<String>,

    /// The delay between typing characters.
    pub type_interval_ms: u64,

    /// The delay between deleting characters.
    pub delete_interval_ms: u64,

    /// How long a fully typed phrase stays on screen.
    pub pause_ms: u64,

    /// The delay before the first character is typed.
    pub initial_delay_ms: u64,

    /// The blinking cursor.
    pub cursor: CursorConfig,
}

impl TypingConfig {
    pub fn timings(&self) -> TypingTimings {
        TypingTimings {
            type_interval: Duration::from_millis(self.type_interval_ms),
            delete_interval: Duration::from_millis(self.delete_interval_ms),
            pause: Duration::from_millis(self.pause_ms),
        }
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// The element ids the animation writes to, in slot order.
    pub fn targets(&self) -> Vec<String> {
        match self.mode {
            TypingMode::Cycle => vec![self.target.clone()],
            TypingMode::Once => self.line_targets.clone(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.phrases.is_empty() {
            return Err(ConfigError::NoPhrases);
        }
        self.timings().validate()?;
        if self.mode == TypingMode::Once && self.line_targets.len() != self.phrases.len() {
            return Err(ConfigError::LineTargetMismatch {
                phrases: self.phrases.len(),
                targets: self.line_targets.len(),
            });
        }
        if let Some(index) = self.phrases.iter().position(String::is_empty) {
            tracing::warn!("phrase #{index} is empty, only its pause will show");
        }
        self.cursor.validate()
    }
}

impl Default for TypingConfig {
    fn default() -> Self {
        let timings = TypingTimings::default();
        Self {
            phrases: DEFAULT_PHRASES.iter().map(|phrase| phrase.to_string()).collect(),
            mode: TypingMode::default(),
            target: "typed-text".into(),
            line_targets: Vec::new(),
            type_interval_ms: timings.type_interval.as_millis() as u64,
            delete_interval_ms: timings.delete_interval.as_millis() as u64,
            pause_ms: timings.pause.as_millis() as u64,
            initial_delay_ms: 1000,
            cursor: CursorConfig::default(),
        }
    }
}

/// The blinking cursor that accompanies the typing animation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(default, deny_unknown_fields)]
pub struct CursorConfig {
    /// The cursor element. The cursor doesn't blink if the page has no such element.
    pub target: String,

    /// The time between visibility flips.
    pub interval_ms: u64,

    /// When to start blinking.
    pub start: BlinkStart,
}

impl CursorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("typing.cursor.interval_ms"));
        }
        Ok(())
    }
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self { target: "cursor".into(), interval_ms: 500, start: BlinkStart::default() }
    }
}

/// The navigation highlighter's configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(default, deny_unknown_fields)]
pub struct ScrollSpyConfig {
    /// Added to the scroll offset before matching sections, usually the header's height.
    pub bias: f64,
}

impl ScrollSpyConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.bias.is_finite() {
            return Err(ConfigError::InvalidBias(self.bias));
        }
        Ok(())
    }
}

impl Default for ScrollSpyConfig {
    fn default() -> Self {
        Self { bias: ScrollSpy::DEFAULT_BIAS }
    }
}

/// Errors that can occur when loading a config.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("no phrases to type")]
    NoPhrases,

    #[error("'{0}' must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("typing once needs one line target per phrase: got {phrases} phrases and {targets} targets")]
    LineTargetMismatch { phrases: usize, targets: usize },

    #[error("scroll spy bias must be a finite number, got {0}")]
    InvalidBias(f64),

    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = SiteConfig::default();
        config.validate().expect("defaults are invalid");
        assert_eq!(config.typing.phrases.len(), 6);
        assert_eq!(config.typing.timings(), TypingTimings::default());
        assert_eq!(config.typing.initial_delay(), Duration::from_millis(1000));
        assert_eq!(config.typing.cursor.interval(), Duration::from_millis(500));
        assert_eq!(config.scroll_spy.bias, 100.0);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = SiteConfig::from_yaml(
            r#"
typing:
  phrases: ["Hello", "World"]
  pause_ms: 200
scroll_spy:
  bias: 80
"#,
        )
        .expect("parse failed");
        assert_eq!(config.typing.phrases, &["Hello", "World"]);
        assert_eq!(config.typing.timings().pause, Duration::from_millis(200));
        assert_eq!(config.typing.type_interval_ms, 100);
        assert_eq!(config.scroll_spy.bias, 80.0);
        assert_eq!(config.page, PageLayout::default());
    }

    #[test]
    fn once_mode_targets() {
        let config = SiteConfig::from_yaml(
            r#"
typing:
  mode: once
  phrases: ["Ab", "Cd"]
  line_targets: ["line-1", "line-2"]
  cursor:
    start: after-first-phrase
"#,
        )
        .expect("parse failed");
        assert_eq!(config.typing.mode, TypingMode::Once);
        assert_eq!(config.typing.targets(), &["line-1", "line-2"]);
        assert_eq!(config.typing.cursor.start, BlinkStart::AfterFirstPhrase);
    }

    #[rstest]
    #[case::no_phrases("typing: { phrases: [] }")]
    #[case::zero_type("typing: { type_interval_ms: 0 }")]
    #[case::zero_delete("typing: { delete_interval_ms: 0 }")]
    #[case::zero_pause("typing: { pause_ms: 0 }")]
    #[case::zero_blink("typing: { cursor: { interval_ms: 0 } }")]
    #[case::missing_line_targets("typing: { mode: once, phrases: [a, b], line_targets: [x] }")]
    #[case::unknown_field("typing: { speed: 3 }")]
    #[case::unknown_mode("typing: { mode: sometimes }")]
    #[case::infinite_bias("scroll_spy: { bias: .inf }")]
    fn invalid(#[case] contents: &str) {
        assert!(SiteConfig::from_yaml(contents).is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("failed to create file");
        writeln!(file, "typing:\n  phrases: [from file]").expect("write failed");
        let config = SiteConfig::load(file.path()).expect("load failed");
        assert_eq!(config.typing.phrases, &["from file"]);
    }

    #[test]
    fn load_missing_file() {
        let result = SiteConfig::load(Path::new("/definitely/not/here.yaml"));
        let Err(error) = result else { panic!("loaded a missing file") };
        assert!(matches!(error, ConfigError::Io { .. }));
        assert!(error.to_string().starts_with("failed to read config file '/definitely/not/here.yaml': "));
    }
}
