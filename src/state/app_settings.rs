use log::LevelFilter;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const LOG_LEVEL_ENV: &str = "WC26_LOG";
pub const EXPORT_DIR_ENV: &str = "WC26_EXPORT_DIR";

#[derive(Debug, Default, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    /// Where exported `.ics` files are written.
    pub export_dir: PathBuf,
}

impl AppSettings {
    pub fn load() -> Self {
        Self::from_vars(env::var(LOG_LEVEL_ENV).ok(), env::var(EXPORT_DIR_ENV).ok())
    }

    fn from_vars(log_level: Option<String>, export_dir: Option<String>) -> Self {
        let log_level = log_level.and_then(|level| LevelFilter::from_str(level.trim()).ok());
        let export_dir = export_dir
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { full_screen: false, log_level, export_dir }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_environment() {
        let settings = AppSettings::from_vars(None, None);
        assert_eq!(settings.log_level, None);
        assert_eq!(settings.export_dir, PathBuf::from("."));
        assert!(!settings.full_screen);
    }

    #[test]
    fn reads_level_and_export_dir() {
        let settings = AppSettings::from_vars(Some("debug".into()), Some("/tmp/ics".into()));
        assert_eq!(settings.log_level, Some(LevelFilter::Debug));
        assert_eq!(settings.export_dir, PathBuf::from("/tmp/ics"));
    }

    #[test]
    fn bad_level_is_ignored() {
        let settings = AppSettings::from_vars(Some("chatty".into()), Some("  ".into()));
        assert_eq!(settings.log_level, None);
        assert_eq!(settings.export_dir, PathBuf::from("."));
    }
}
