//! Engine tuning knobs.

use crate::error::{ConfigError, ConfigResult};
use cuesync_offset::OffsetConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Frame cadence of the tick loop (~60 Hz).
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// Margin past the current time before "next cue" looks for a start, so a
/// cue that has just begun is not picked again.
pub const NEXT_CUE_DEBOUNCE: f64 = 0.5;

/// How far behind the current time "previous cue" must look.
pub const PREVIOUS_CUE_MARGIN: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub frame_interval_ms: u64,
    pub next_cue_debounce: f64,
    pub previous_cue_margin: f64,
    pub offset: OffsetConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            next_cue_debounce: NEXT_CUE_DEBOUNCE,
            previous_cue_margin: PREVIOUS_CUE_MARGIN,
            offset: OffsetConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "frame_interval_ms",
                message: "must be greater than zero".to_string(),
            });
        }
        if !is_non_negative(self.next_cue_debounce) {
            return Err(ConfigError::Invalid {
                field: "next_cue_debounce",
                message: format!("must be non-negative, got {}", self.next_cue_debounce),
            });
        }
        if !is_non_negative(self.previous_cue_margin) {
            return Err(ConfigError::Invalid {
                field: "previous_cue_margin",
                message: format!("must be non-negative, got {}", self.previous_cue_margin),
            });
        }
        let OffsetConfig { min, max, default } = self.offset;
        let ordered = min <= default && default <= max;
        if !ordered {
            return Err(ConfigError::Invalid {
                field: "offset",
                message: format!("expected min <= default <= max, got {min} / {default} / {max}"),
            });
        }
        Ok(())
    }
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.frame_interval(), Duration::from_millis(16));
    }

    #[test]
    fn test_partial_offset_section() {
        let config = EngineConfig::from_json_str(r#"{"offset": {"default": 0.0}}"#).unwrap();
        assert_eq!(config.offset.default, 0.0);
        assert_eq!(config.offset.min, -5.0);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"frame_interval_ms": 0}"#),
            Err(ConfigError::Invalid { field: "frame_interval_ms", .. })
        ));
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"next_cue_debounce": -1}"#),
            Err(ConfigError::Invalid { field: "next_cue_debounce", .. })
        ));
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"offset": {"min": 1, "max": -1}}"#),
            Err(ConfigError::Invalid { field: "offset", .. })
        ));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, br#"{"frame_interval_ms": 33}"#).unwrap();
        let config = EngineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.frame_interval_ms, 33);

        let missing = EngineConfig::from_path(Path::new("/nonexistent/cuesync.json"));
        assert!(matches!(missing, Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            EngineConfig::from_json_str("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
