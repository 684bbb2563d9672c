//! Startup settings

use std::path::Path;

use gramasathi_config::{load_settings_from, ConfigError, Settings};

/// Settings from `dir`, or the built-in defaults plus the load error
///
/// The server still starts on a broken configuration; callers report the
/// error once tracing is up.
pub fn load_or_default(dir: &Path, env: Option<&str>) -> (Settings, Option<ConfigError>) {
    match load_settings_from(dir, env) {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    }
}
