use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Layout and timing knobs for both overlay kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Content width of the click overlay, excluding side padding.
    pub overlay_width: f32,
    pub side_padding: f32,
    /// Gap between the anchor's bottom edge and the overlay.
    pub vertical_offset: f32,
    /// Dwell time before a hover materializes the tooltip.
    pub hover_delay_ms: u64,
    /// Distance kept between the pointer and the tooltip plate.
    pub cursor_gap: f32,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            overlay_width: 928.0,
            side_padding: 24.0,
            vertical_offset: 20.0,
            hover_delay_ms: 700,
            cursor_gap: 32.0,
        }
    }
}

impl OverlaySettings {
    pub fn hover_delay(&self) -> Duration {
        Duration::from_millis(self.hover_delay_ms)
    }

    /// Load settings from a JSON file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "overlay_width": 400, "hover_delay_ms": 250 }}"#).unwrap();

        let settings = OverlaySettings::load(file.path()).unwrap();
        assert_eq!(settings.overlay_width, 400.0);
        assert_eq!(settings.hover_delay(), Duration::from_millis(250));
        assert_eq!(settings.side_padding, 24.0);
        assert_eq!(settings.cursor_gap, 32.0);
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = OverlaySettings::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse settings"));
    }

    #[test]
    fn test_load_or_default_without_path() {
        let settings = OverlaySettings::load_or_default(None).unwrap();
        assert_eq!(settings, OverlaySettings::default());
    }
}
