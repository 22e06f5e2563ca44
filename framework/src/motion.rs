/// Motion detection by sample-to-sample acceleration change
///
/// The detector compares each sample against the one taken a period earlier.
/// Motion is flagged when any axis moved by more than the threshold; the
/// flag describes the latest tick only and is not latched.
use crate::sensors::AccelSample;

/// Default sampling period (ms)
pub const DEFAULT_MOTION_PERIOD_MS: u32 = 2000;

/// Default per-axis change threshold (g)
pub const DEFAULT_MOTION_THRESHOLD_G: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionConfig {
    pub period_ms: u32,
    /// Strictly-greater-than threshold on any axis delta (g)
    pub threshold_g: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            period_ms: DEFAULT_MOTION_PERIOD_MS,
            threshold_g: DEFAULT_MOTION_THRESHOLD_G,
        }
    }
}

pub struct MotionDetector {
    config: MotionConfig,
    previous: Option<AccelSample>,
    motion: bool,
}

impl MotionDetector {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            previous: None,
            motion: false,
        }
    }

    /// Process one sample and return the new motion flag.
    ///
    /// The first sample only seeds the baseline.
    pub fn update(&mut self, sample: AccelSample) -> bool {
        self.motion = match self.previous {
            Some(previous) => sample.max_axis_delta(&previous) > self.config.threshold_g,
            None => false,
        };
        self.previous = Some(sample);
        self.motion
    }

    /// Motion flag from the latest tick
    pub fn motion(&self) -> bool {
        self.motion
    }

    pub fn previous(&self) -> Option<AccelSample> {
        self.previous
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> MotionDetector {
        MotionDetector::new(MotionConfig::default())
    }

    #[test]
    fn test_first_sample_seeds_baseline() {
        let mut d = detector();
        assert!(!d.update(AccelSample::new(0.9, -0.7, 1.3)));
        assert_eq!(d.previous(), Some(AccelSample::new(0.9, -0.7, 1.3)));
    }

    #[test]
    fn test_delta_above_threshold_flags_motion() {
        let mut d = detector();
        d.update(AccelSample::new(0.0, 0.0, 1.0));
        assert!(d.update(AccelSample::new(0.0, 0.25, 1.0)));
        assert!(d.motion());
    }

    #[test]
    fn test_small_delta_is_quiet() {
        let mut d = detector();
        d.update(AccelSample::new(0.0, 0.0, 1.0));
        assert!(!d.update(AccelSample::new(0.1, -0.15, 1.05)));
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut d = MotionDetector::new(MotionConfig {
            period_ms: 2000,
            threshold_g: 0.25,
        });
        d.update(AccelSample::new(0.0, 0.0, 1.0));
        // 0.25 is exact in binary, so the delta equals the threshold
        assert!(!d.update(AccelSample::new(0.25, 0.0, 1.0)));
    }

    #[test]
    fn test_flag_not_latched() {
        let mut d = detector();
        d.update(AccelSample::new(0.0, 0.0, 1.0));
        assert!(d.update(AccelSample::new(0.0, 0.0, 0.5)));
        assert!(!d.update(AccelSample::new(0.0, 0.0, 0.5)));
        assert!(!d.motion());
    }

    #[test]
    fn test_compares_against_previous_sample_not_first() {
        let mut d = detector();
        d.update(AccelSample::new(0.0, 0.0, 1.0));
        d.update(AccelSample::new(0.15, 0.0, 1.0));
        // 0.3 from the first sample but only 0.15 from the previous one
        assert!(!d.update(AccelSample::new(0.3, 0.0, 1.0)));
    }
}
