//! Utility helpers — path resolution and string manipulation.

use std::path::PathBuf;

/// File name gcloud uses for application-default credentials.
pub const ADC_FILE_NAME: &str = "application_default_credentials.json";

/// Get the PromptGate data directory (e.g. `~/.promptgate/`).
pub fn get_data_path() -> PathBuf {
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".promptgate")
}

/// Expand `~` to the home directory in a path string.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Well-known location of the gcloud application-default credentials file.
///
/// `CLOUDSDK_CONFIG` wins; otherwise `%APPDATA%\gcloud` on Windows and
/// `~/.config/gcloud` elsewhere. `None` when no base directory is known.
pub fn gcloud_adc_path(cloudsdk_config: Option<&str>, appdata: Option<&str>) -> Option<PathBuf> {
    if let Some(dir) = cloudsdk_config {
        return Some(PathBuf::from(dir).join(ADC_FILE_NAME));
    }
    if cfg!(windows) {
        return appdata.map(|dir| PathBuf::from(dir).join("gcloud").join(ADC_FILE_NAME));
    }
    dirs_next::home_dir().map(|home| home.join(".config").join("gcloud").join(ADC_FILE_NAME))
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        let result = truncate_string("hello world, this is a long string", 15);
        assert_eq!(result, "hello world,...");
    }

    #[test]
    fn test_truncate_unicode() {
        let result = truncate_string("こんにちは世界です", 5);
        assert_eq!(result, "こん...");
    }

    #[test]
    fn test_expand_home_tilde() {
        let expanded = expand_home("~/test/path");
        assert!(!expanded.starts_with("~"));
        assert!(expanded.to_str().unwrap().ends_with("test/path"));
    }

    #[test]
    fn test_expand_home_absolute() {
        let expanded = expand_home("/absolute/path");
        assert_eq!(expanded, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_data_path_ends_with_promptgate() {
        assert!(get_data_path().ends_with(".promptgate"));
    }

    #[test]
    fn test_adc_path_prefers_cloudsdk_config() {
        let path = gcloud_adc_path(Some("/custom/gcloud"), Some("/appdata")).unwrap();
        assert_eq!(
            path,
            PathBuf::from("/custom/gcloud/application_default_credentials.json")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_adc_path_default_under_home() {
        if let Some(path) = gcloud_adc_path(None, None) {
            assert!(path.ends_with(".config/gcloud/application_default_credentials.json"));
        }
    }
}
