//! Search tuning loaded from TOML, held in a lazily initialized global.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`
//!
//! Policies copy their section at construction time, so tests and embedders
//! can also build them from an explicit `TypingSettings` / `GestureSettings`.

use std::sync::OnceLock;

use serde::Deserialize;

use crate::dict::format::MAX_WORD_LENGTH;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Install custom tuning. Fails if the TOML is invalid or if `settings()` has
/// already been read (the first read freezes the configuration).
pub fn init_custom(toml_content: impl Into<String>) -> Result<(), SettingsError> {
    let toml_content = toml_content.into();
    parse_settings_toml(&toml_content)?;
    if SETTINGS.get().is_some() {
        return Err(SettingsError::AlreadyInitialized);
    }
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// The process-wide settings, parsed on first use.
pub fn settings() -> &'static Settings {
    SETTINGS.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map_or(DEFAULT_SETTINGS_TOML, String::as_str);
        parse_settings_toml(toml_str).expect("embedded settings are checked by build.rs")
    })
}

pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub search: SearchSettings,
    pub typing: TypingSettings,
    pub gesture: GestureSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    /// Default output capacity for a suggestion query.
    pub max_results: usize,
    /// Longest word (in code points) the search will build.
    pub max_word_length: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypingSettings {
    pub beam_width: usize,
    pub max_edits: usize,
    pub case_mismatch_cost: f32,
    pub proximity_cost: f32,
    pub substitution_cost: f32,
    pub omission_cost: f32,
    pub insertion_cost: f32,
    pub completion_cost: f32,
    pub max_completion_chars: usize,
    pub language_weight: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GestureSettings {
    pub beam_width: usize,
    /// Samples searched ahead of the last match for the next key.
    pub window: usize,
    /// Look-ahead for the very first key of a gesture.
    pub first_window: usize,
    /// Farthest a sample may be from a key centre, in key widths.
    pub max_key_distance: f32,
    pub distance_weight: f32,
    pub path_weight: f32,
    /// Weight of the log excess speed of a matched sample over the median.
    pub speed_weight: f32,
    pub doubled_letter_cost: f32,
    pub unknown_char_cost: f32,
    pub tail_samples: usize,
    pub tail_weight: f32,
    pub space_cost: f32,
    pub max_words: usize,
    pub language_weight: f32,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    // Written as !(x >= 0.0) so NaN is rejected too.
    macro_rules! check_non_negative {
        ($section:ident . $field:ident) => {
            if !(s.$section.$field >= 0.0) {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be non-negative".to_string(),
                });
            }
        };
    }
    macro_rules! check_positive_usize {
        ($section:ident . $field:ident) => {
            if s.$section.$field == 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }

    check_positive_usize!(search.max_results);
    check_positive_usize!(search.max_word_length);
    if s.search.max_word_length > MAX_WORD_LENGTH {
        return Err(SettingsError::InvalidValue {
            field: "search.max_word_length".to_string(),
            reason: format!("must be at most {MAX_WORD_LENGTH}"),
        });
    }

    check_positive_usize!(typing.beam_width);
    check_non_negative!(typing.case_mismatch_cost);
    check_non_negative!(typing.proximity_cost);
    check_non_negative!(typing.substitution_cost);
    check_non_negative!(typing.omission_cost);
    check_non_negative!(typing.insertion_cost);
    check_non_negative!(typing.completion_cost);
    check_non_negative!(typing.language_weight);

    check_positive_usize!(gesture.beam_width);
    check_positive_usize!(gesture.window);
    check_positive_usize!(gesture.first_window);
    check_positive_usize!(gesture.max_words);
    check_non_negative!(gesture.max_key_distance);
    check_non_negative!(gesture.distance_weight);
    check_non_negative!(gesture.path_weight);
    check_non_negative!(gesture.speed_weight);
    check_non_negative!(gesture.doubled_letter_cost);
    check_non_negative!(gesture.unknown_char_cost);
    check_non_negative!(gesture.tail_weight);
    check_non_negative!(gesture.space_cost);
    check_non_negative!(gesture.language_weight);

    Ok(())
}
