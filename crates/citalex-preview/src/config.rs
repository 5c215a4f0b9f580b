//! Preview tuning knobs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::position::Size;

/// Settings shared by the preview cache and session controller.
///
/// Durations are (de)serialised as integer milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Quiet period between a hover and the cache lookup / fetch.
    #[serde(rename = "debounce_ms", with = "millis")]
    pub debounce: Duration,
    #[serde(rename = "cache_ttl_ms", with = "millis")]
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub popup_size: Size,
    pub viewport: Size,
    /// Distance between the hover target and the popup.
    pub gap: f64,
    /// Minimum distance between the popup and the viewport edge.
    pub margin: f64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            cache_ttl: Duration::from_secs(10 * 60),
            cache_capacity: 50,
            popup_size: Size::new(360.0, 240.0),
            viewport: Size::new(1280.0, 800.0),
            gap: 8.0,
            margin: 8.0,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    /// Durations beyond `u64::MAX` milliseconds saturate.
    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = PreviewConfig::default();
        assert_eq!(cfg.debounce, Duration::from_millis(300));
        assert_eq!(cfg.cache_ttl, Duration::from_secs(600));
        assert_eq!(cfg.cache_capacity, 50);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: PreviewConfig =
            serde_json::from_str(r#"{ "debounce_ms": 150, "cache_capacity": 10 }"#).unwrap();
        assert_eq!(cfg.debounce, Duration::from_millis(150));
        assert_eq!(cfg.cache_capacity, 10);
        assert_eq!(cfg.cache_ttl, Duration::from_secs(600));
    }

    #[test]
    fn durations_serialise_as_millis() {
        let json = serde_json::to_value(PreviewConfig::default()).unwrap();
        assert_eq!(json["debounce_ms"], 300);
        assert_eq!(json["cache_ttl_ms"], 600_000);
    }

    #[test]
    fn oversized_duration_saturates() {
        let cfg = PreviewConfig {
            cache_ttl: Duration::MAX,
            ..PreviewConfig::default()
        };
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["cache_ttl_ms"], u64::MAX);

        let back: PreviewConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back.cache_ttl, Duration::from_millis(u64::MAX));
    }
}
