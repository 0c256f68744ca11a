use crate::error::{CoreError, Result};
use crate::types::TimeUs;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Editor defaults for clips whose length is not dictated by their media.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorSettings {
    /// Length given to a media clip until its natural duration is known.
    pub placeholder_duration_us: TimeUs,
    /// Length of a newly inserted still image.
    pub image_duration_us: TimeUs,
    /// Length of a manually added text clip.
    pub text_duration_us: TimeUs,
}

impl Default for EditorSettings {
    fn default() -> Self {
        preset_default()
    }
}

impl EditorSettings {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let settings: EditorSettings = serde_json::from_str(&data)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let fields = [
            ("placeholder_duration_us", self.placeholder_duration_us),
            ("image_duration_us", self.image_duration_us),
            ("text_duration_us", self.text_duration_us),
        ];
        for (name, value) in fields {
            if !value.is_positive() {
                return Err(CoreError::InvalidOperation(format!(
                    "setting {name} must be positive, got {}",
                    value.0
                )));
            }
        }
        Ok(())
    }
}

/// 10s placeholder, 5s stills, 3s text.
pub fn preset_default() -> EditorSettings {
    EditorSettings {
        placeholder_duration_us: TimeUs(10_000_000),
        image_duration_us: TimeUs(5_000_000),
        text_duration_us: TimeUs(3_000_000),
    }
}

/// Shorter defaults for vertical short-form edits.
pub fn preset_shorts() -> EditorSettings {
    EditorSettings {
        placeholder_duration_us: TimeUs(10_000_000),
        image_duration_us: TimeUs(2_000_000),
        text_duration_us: TimeUs(1_500_000),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let settings = preset_shorts();
        settings.save_to_file(&path).unwrap();
        let loaded = EditorSettings::load_from_file(&path).unwrap();
        assert_eq!(settings, loaded);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "text_duration_us": 750000 }"#).unwrap();

        let loaded = EditorSettings::load_from_file(&path).unwrap();
        assert_eq!(loaded.text_duration_us, TimeUs(750_000));
        assert_eq!(loaded.image_duration_us, preset_default().image_duration_us);
    }

    #[test]
    fn non_positive_durations_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "image_duration_us": 0 }"#).unwrap();

        let result = EditorSettings::load_from_file(&path);
        assert!(matches!(result, Err(CoreError::InvalidOperation(_))));
    }

    #[test]
    fn load_nonexistent_file_returns_error() {
        let result = EditorSettings::load_from_file("/tmp/does_not_exist_aicut_settings.json");
        assert!(matches!(result, Err(CoreError::Io(_))));
    }

    #[test]
    fn preset_values() {
        let d = preset_default();
        assert_eq!(d.placeholder_duration_us, TimeUs(10_000_000));
        assert_eq!(d.image_duration_us, TimeUs(5_000_000));
        assert_eq!(d.text_duration_us, TimeUs(3_000_000));
        assert_eq!(EditorSettings::default(), d);
    }
}
