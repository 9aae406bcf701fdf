use std::fs;

use suggest_core::settings;

pub fn settings_export() {
    print!("{}", settings::default_toml());
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let s = die!(settings::parse_settings_toml(&content), "Error: {}");
    println!(
        "OK: search.max_results={}, typing.beam_width={}, gesture.beam_width={}",
        s.search.max_results, s.typing.beam_width, s.gesture.beam_width
    );
}

/// Install `file` as the process-wide settings. Must run before any
/// dictionary is opened.
pub fn load_settings(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    die!(settings::init_custom(content), "Error loading settings: {}");
}
