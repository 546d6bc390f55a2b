use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_OPACITY: f32 = 0.5;
pub const DEFAULT_ANIMATION_DURATION_MS: u64 = 200;
pub const DEFAULT_INFO_DELAY_MS: u64 = 1000;

/// Per-widget display options.
///
/// Zero or non-finite values mean "use the default", so a document can leave
/// a field at `0` without blanking the overlay.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Opacity of the dimming overlay while it is shown.
    pub opacity: f32,
    /// Fade duration for every opacity change.
    pub animation_duration_ms: u64,
    /// How long the info preview keeps the overlay up before fading it.
    pub info_delay_ms: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            opacity: DEFAULT_OPACITY,
            animation_duration_ms: DEFAULT_ANIMATION_DURATION_MS,
            info_delay_ms: DEFAULT_INFO_DELAY_MS,
        }
    }
}

impl Options {
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        Self {
            opacity: if self.opacity.is_finite() && self.opacity > 0.0 {
                self.opacity.min(1.0)
            } else {
                defaults.opacity
            },
            animation_duration_ms: match self.animation_duration_ms {
                0 => defaults.animation_duration_ms,
                ms => ms,
            },
            info_delay_ms: match self.info_delay_ms {
                0 => defaults.info_delay_ms,
                ms => ms,
            },
        }
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    pub fn info_delay(&self) -> Duration {
        Duration::from_millis(self.info_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_fields_fall_back_to_defaults() {
        let options = Options {
            opacity: 0.0,
            animation_duration_ms: 0,
            info_delay_ms: 600,
        }
        .normalized();
        assert_eq!(options.opacity, 0.5);
        assert_eq!(options.animation_duration(), Duration::from_millis(200));
        assert_eq!(options.info_delay(), Duration::from_millis(600));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let options: Options = serde_json::from_str(r#"{"opacity": 0.8}"#).unwrap();
        assert_eq!(options.opacity, 0.8);
        assert_eq!(options.animation_duration_ms, 200);
        assert_eq!(options.info_delay_ms, 1000);
    }
}
