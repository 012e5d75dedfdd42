use std::time::Duration;

use crate::playback::{
    clamp_char_delay, clamp_chars_per_tick, clamp_line_delay, PlaybackMode, PlaybackOptions,
    PlaybackSettings,
};

/// Playback preferences, e.g. from a `rapstar.toml` file.
///
/// All fields are optional so partial files keep working; missing or
/// out-of-range values fall back to defaults or are clamped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaybackConfig {
    pub mode: Option<PlaybackMode>,
    pub char_delay_ms: Option<u64>,
    pub line_delay_ms: Option<u64>,
    pub chars_per_tick: Option<usize>,
    pub highlight_term: Option<String>,
}

impl PlaybackConfig {
    /// Parse a TOML string into `PlaybackConfig`.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Resolve into concrete live settings.
    pub fn settings(&self) -> PlaybackSettings {
        let defaults = PlaybackSettings::default();
        PlaybackSettings {
            char_delay: self
                .char_delay_ms
                .map(|ms| clamp_char_delay(Duration::from_millis(ms)))
                .unwrap_or(defaults.char_delay),
            line_delay: self
                .line_delay_ms
                .map(|ms| clamp_line_delay(Duration::from_millis(ms)))
                .unwrap_or(defaults.line_delay),
            chars_per_tick: self
                .chars_per_tick
                .map(clamp_chars_per_tick)
                .unwrap_or(defaults.chars_per_tick),
            highlight_term: self.highlight_term.clone().unwrap_or_default(),
        }
    }

    /// Resolve into options for a Play command.
    pub fn options(&self) -> PlaybackOptions {
        PlaybackOptions {
            mode: self.mode.unwrap_or_default(),
            settings: self.settings(),
        }
    }
}
