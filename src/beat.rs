//! Onset detection with a hard refractory period.

use crate::features::FeatureSample;
use crate::params::BeatConfig;

/// Detector state exposed per frame. `is_beat` is true only on the frame
/// a beat fires and is never latched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatState {
    pub last_beat_time: f32,
    pub energy: f32,
    pub is_beat: bool,
}

/// Simple energy-rise onset detector. Combined energy weights the low
/// end heavily (0.6 bass + 0.3 mid + 0.1 amplitude); a beat needs a
/// sharp rise, an absolute floor, and a clear refractory window.
pub struct BeatDetector {
    config: BeatConfig,
    state: BeatState,
}

impl BeatDetector {
    pub fn new(config: BeatConfig) -> Self {
        Self {
            config,
            state: BeatState {
                last_beat_time: 0.0,
                energy: 0.0,
                is_beat: false,
            },
        }
    }

    /// Advance one frame. `now` is simulated (domain) time in seconds.
    /// Returns whether a beat fired this frame.
    pub fn step(&mut self, features: &FeatureSample, now: f32) -> bool {
        let energy = 0.6 * features.bass + 0.3 * features.mid + 0.1 * features.amplitude;
        let delta = energy - self.state.energy;

        let fired = delta > self.config.rise_threshold
            && energy > self.config.energy_floor
            && now - self.state.last_beat_time > self.config.refractory_s;

        if fired {
            self.state.last_beat_time = now;
        }
        self.state.is_beat = fired;
        // Previous energy tracks every frame, beat or not.
        self.state.energy = energy;

        fired
    }

    pub fn state(&self) -> &BeatState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(bass: f32, mid: f32, amplitude: f32) -> FeatureSample {
        FeatureSample {
            bass,
            mid,
            amplitude,
            ..FeatureSample::default()
        }
    }

    #[test]
    fn test_beat_fires_on_sharp_rise() {
        let mut detector = BeatDetector::new(BeatConfig::default());
        assert!(!detector.step(&sample(0.1, 0.1, 0.1), 0.3));
        assert!(detector.step(&sample(0.9, 0.5, 0.8), 0.316));
    }

    #[test]
    fn test_refractory_window_suppresses_double_fires() {
        let mut detector = BeatDetector::new(BeatConfig::default());
        let quiet = sample(0.0, 0.0, 0.0);
        let spike = sample(0.9, 0.6, 0.8);

        // Alternate quiet/spike every 0.05 simulated seconds; each spike
        // satisfies rise and floor, so only the refractory gate limits it.
        let dt = 0.05;
        let mut now = 0.25; // past the initial guard window
        let mut beat_times = Vec::new();
        for frame in 0..80 {
            let features = if frame % 2 == 0 { &spike } else { &quiet };
            if detector.step(features, now) {
                beat_times.push(now);
            }
            now += dt;
        }

        assert!(!beat_times.is_empty());
        for pair in beat_times.windows(2) {
            assert!(
                pair[1] - pair[0] > 0.2,
                "beats {}s apart violate refractory",
                pair[1] - pair[0]
            );
        }
    }

    #[test]
    fn test_sustained_energy_does_not_retrigger() {
        let mut detector = BeatDetector::new(BeatConfig::default());
        let loud = sample(0.9, 0.6, 0.8);

        assert!(detector.step(&loud, 0.3));
        // Energy stays high but stops rising, so no further beats.
        for i in 1..20 {
            assert!(!detector.step(&loud, 0.3 + i as f32 * 0.1));
        }
    }

    #[test]
    fn test_energy_floor_gates_quiet_onsets() {
        let mut detector = BeatDetector::new(BeatConfig::default());
        assert!(!detector.step(&sample(0.0, 0.0, 0.0), 0.3));
        // Big relative rise, but absolute energy below the floor.
        assert!(!detector.step(&sample(0.3, 0.2, 0.2), 0.4));
    }

    #[test]
    fn test_is_beat_not_latched() {
        let mut detector = BeatDetector::new(BeatConfig::default());
        detector.step(&sample(0.9, 0.6, 0.8), 0.3);
        assert!(detector.state().is_beat);
        detector.step(&sample(0.9, 0.6, 0.8), 0.4);
        assert!(!detector.state().is_beat);
    }
}
