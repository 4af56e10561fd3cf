//! Pipeline configuration.
//!
//! All options are startup constants.  [`PipelineConfig::validate`] runs once
//! before the frame loop; nothing is re-checked per frame.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::fingers::{LandmarkPair, DEFAULT_PAIRS};
use crate::landmark::LANDMARK_COUNT;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Pointer smoothing coefficient (lower = steadier, slower).
    pub smoothing_alpha_pointer: f64,
    /// Volume smoothing coefficient.
    pub smoothing_alpha_volume:  f64,
    /// Frame border ignored by the ROI mapper, as a fraction of each side.
    pub roi_margin:              f64,

    /// Thumb–index distance (frame pixels) below which a pinch starts.
    pub pinch_threshold_px:      f64,
    /// Thumb–index distance at or above which a pinch ends.
    pub pinch_release_px:        f64,
    pub click_cooldown_s:        f64,

    pub volume_rate_limit_s:     f64,
    /// Minimum change, in percent, worth sending to the volume actuator.
    pub volume_dead_band:        u8,
    pub volume_distance_min:     f64,
    pub volume_distance_max:     f64,
    /// Only condition volume while the open-hand mode is on.
    pub volume_requires_mode:    bool,

    /// `(tip, reference)` pairs in thumb..pinky order.
    pub open_closed_landmark_pairs: [LandmarkPair; 5],
    /// Smallest wrist→thumb-tip x offset trusted as thumb polarity.
    pub thumb_polarity_epsilon:  f64,

    pub frame_width:             u32,
    pub frame_height:            u32,
    pub screen_width:            u32,
    pub screen_height:           u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            smoothing_alpha_pointer:    0.25,
            smoothing_alpha_volume:     0.20,
            roi_margin:                 0.15,
            pinch_threshold_px:         35.0,
            pinch_release_px:           35.0,
            click_cooldown_s:           0.45,
            volume_rate_limit_s:        0.12,
            volume_dead_band:           2,
            volume_distance_min:        0.02,
            volume_distance_max:        0.18,
            volume_requires_mode:       true,
            open_closed_landmark_pairs: DEFAULT_PAIRS,
            thumb_polarity_epsilon:     0.01,
            frame_width:                640,
            frame_height:               480,
            screen_width:               1920,
            screen_height:              1080,
        }
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonNegative { name, value })
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("smoothing_alpha_pointer", self.smoothing_alpha_pointer),
            ("smoothing_alpha_volume",  self.smoothing_alpha_volume),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::SmoothingAlpha { name, value });
            }
        }

        if !(0.0..0.5).contains(&self.roi_margin) {
            return Err(ConfigError::DegenerateRoi { margin: self.roi_margin });
        }

        non_negative("pinch_threshold_px",     self.pinch_threshold_px)?;
        non_negative("pinch_release_px",       self.pinch_release_px)?;
        non_negative("click_cooldown_s",       self.click_cooldown_s)?;
        non_negative("volume_rate_limit_s",    self.volume_rate_limit_s)?;
        non_negative("thumb_polarity_epsilon", self.thumb_polarity_epsilon)?;

        if self.pinch_release_px < self.pinch_threshold_px {
            return Err(ConfigError::PinchOrdering {
                threshold: self.pinch_threshold_px,
                release:   self.pinch_release_px,
            });
        }

        if !(self.volume_distance_min.is_finite()
            && self.volume_distance_max.is_finite()
            && self.volume_distance_min < self.volume_distance_max)
        {
            return Err(ConfigError::DistanceRange {
                min: self.volume_distance_min,
                max: self.volume_distance_max,
            });
        }

        if self.volume_dead_band > 100 {
            return Err(ConfigError::DeadBand(self.volume_dead_band));
        }

        for pair in self.open_closed_landmark_pairs.iter() {
            for index in [pair.tip, pair.reference] {
                if index >= LANDMARK_COUNT {
                    return Err(ConfigError::LandmarkIndex { index });
                }
            }
        }

        for (name, width, height) in [
            ("frame",  self.frame_width,  self.frame_height),
            ("screen", self.screen_width, self.screen_height),
        ] {
            if width == 0 || height == 0 {
                return Err(ConfigError::Extent { name, width, height });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(PipelineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn inverted_distance_range_fails_fast() {
        let cfg = PipelineConfig {
            volume_distance_min: 0.18,
            volume_distance_max: 0.02,
            ..PipelineConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::DistanceRange { min: 0.18, max: 0.02 })
        );
        let cfg = PipelineConfig {
            volume_distance_min: 0.1,
            volume_distance_max: 0.1,
            ..PipelineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn half_margin_is_degenerate() {
        let cfg = PipelineConfig { roi_margin: 0.5, ..PipelineConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::DegenerateRoi { margin: 0.5 }));
    }

    #[test]
    fn release_below_threshold_rejected() {
        let cfg = PipelineConfig { pinch_release_px: 20.0, ..PipelineConfig::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::PinchOrdering { .. })));
    }

    #[test]
    fn zero_alpha_rejected() {
        let cfg = PipelineConfig { smoothing_alpha_pointer: 0.0, ..PipelineConfig::default() };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::SmoothingAlpha { name: "smoothing_alpha_pointer", .. })
        ));
    }

    #[test]
    fn bad_landmark_pair_rejected() {
        let mut cfg = PipelineConfig::default();
        cfg.open_closed_landmark_pairs[2].tip = 21;
        assert_eq!(cfg.validate(), Err(ConfigError::LandmarkIndex { index: 21 }));
    }

    #[test]
    fn zero_screen_rejected() {
        let cfg = PipelineConfig { screen_width: 0, ..PipelineConfig::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::Extent { name: "screen", .. })));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: PipelineConfig =
            serde_json::from_str(r#"{ "roi_margin": 0.2, "volume_dead_band": 3 }"#).unwrap();
        assert_eq!(cfg.roi_margin, 0.2);
        assert_eq!(cfg.volume_dead_band, 3);
        assert_eq!(cfg.click_cooldown_s, 0.45);
    }
}
