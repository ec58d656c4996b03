//! Looping playback of a model's animation clips.

/// A named clip with a fixed duration.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub duration_secs: f32,
}

/// Plays every clip of a model at once, each looping forever.
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    clips: Vec<AnimationClip>,
    times: Vec<f32>,
}

impl AnimationPlayer {
    /// Returns `None` when there is nothing to play.
    pub fn new(clips: Vec<AnimationClip>) -> Option<Self> {
        if clips.is_empty() {
            return None;
        }
        let times = vec![0.0; clips.len()];
        Some(Self { clips, times })
    }

    /// Advance every clip by `delta_secs`, wrapping at the clip's end.
    ///
    /// Zero-length clips stay at time zero. Negative or non-finite deltas
    /// are ignored.
    pub fn advance(&mut self, delta_secs: f32) {
        if !delta_secs.is_finite() || delta_secs <= 0.0 {
            return;
        }
        for (time, clip) in self.times.iter_mut().zip(&self.clips) {
            if clip.duration_secs > 0.0 {
                *time = (*time + delta_secs).rem_euclid(clip.duration_secs);
            }
        }
    }

    /// Current playback time of the clip named `name`.
    pub fn time_of(&self, name: &str) -> Option<f32> {
        self.clips
            .iter()
            .position(|c| c.name == name)
            .map(|i| self.times[i])
    }

    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }
}
