//! Window and frame settings, persisted as JSON.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::display::{Orientation, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::error::{RasterError, RasterResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Lock presentation to the monitor refresh
    pub vsync: bool,
    pub orientation: Orientation,
    /// How often the backend logs its frame rate
    pub fps_report_interval_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: String::from("softraster"),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            vsync: true,
            orientation: Orientation::TopDown,
            fps_report_interval_ms: 1000,
        }
    }
}

impl RenderConfig {
    /// Save config to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> RasterResult<()> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| RasterError::config(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load config from a JSON file; absent fields keep their defaults
    pub fn load(path: impl AsRef<Path>) -> RasterResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| RasterError::config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RasterResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RasterError::config(format!(
                "window size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    pub fn fps_report_interval(&self) -> Duration {
        Duration::from_millis(self.fps_report_interval_ms)
    }
}

/// Parse a `WxH` resolution string such as `1920x1080`
pub fn parse_resolution(s: &str) -> RasterResult<(u32, u32)> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| RasterError::config(format!("resolution '{}' is not WxH", s)))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| RasterError::config(format!("resolution '{}': {}", s, e)))
    };
    Ok((parse(w)?, parse(h)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = RenderConfig::default();
        assert_eq!((c.width, c.height), (1024, 768));
        assert!(c.vsync);
        assert_eq!(c.orientation, Orientation::TopDown);
        assert_eq!(c.fps_report_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let json = r#"{ "width": 320, "orientation": "bottom_up" }"#;
        let c: RenderConfig = serde_json::from_str(json).unwrap();
        assert_eq!(c.width, 320);
        assert_eq!(c.height, 768);
        assert_eq!(c.orientation, Orientation::BottomUp);
        assert_eq!(c.title, "softraster");
    }

    #[test]
    fn test_validate_rejects_zero() {
        let c = RenderConfig {
            height: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(c.validate(), Err(RasterError::Config(_))));
    }

    #[test]
    fn test_save_load_file() {
        let path = std::env::temp_dir()
            .join(format!("softraster_config_{}.json", std::process::id()));
        let c = RenderConfig {
            title: "sketch".into(),
            vsync: false,
            ..RenderConfig::default()
        };
        c.save(&path).unwrap();
        assert_eq!(RenderConfig::load(&path).unwrap(), c);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution("1920x1080").unwrap(), (1920, 1080));
        assert_eq!(parse_resolution("64X48").unwrap(), (64, 48));
        assert!(parse_resolution("1920").is_err());
        assert!(parse_resolution("ax9").is_err());
    }
}
