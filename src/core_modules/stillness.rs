// THEORY:
// The `StillnessTrigger` is the decision core of the capture engine. It is a
// stateful, per-session analyzer that watches the stream of landmark sets and
// decides, frame by frame, whether the hand has held still long enough to
// justify a capture.
//
// Key architectural principles:
// 1.  **Two-Part State**: The trigger remembers exactly two things between
//     frames: the previous landmark set (the motion baseline) and the instant
//     the current still-period began. Nothing else persists.
// 2.  **Full Reset on Gaps**: A frame with no detected hand clears both pieces
//     of state. A hand that disappears and reappears restarts the still-timer
//     from scratch; no baseline survives a gap.
// 3.  **Fire Once Per Still-Period**: The timer is cleared the moment the
//     trigger fires, so a hand that stays motionless does not fire again until
//     motion (or a gap) resets the cycle.

use crate::core_modules::landmarks::LandmarkSet;
use std::time::{Duration, Instant};

const DEFAULT_MOTION_THRESHOLD: f64 = 0.005;
const DEFAULT_REQUIRED_STILL: Duration = Duration::from_millis(2000);

/// Watches per-frame landmark sets and fires when the hand has been
/// motionless for the required duration.
pub struct StillnessTrigger {
    /// Motion scores below this are treated as "still."
    motion_threshold: f64,
    /// How long the hand must stay below the motion threshold before firing.
    required_still: Duration,
    /// The previous frame's landmarks, the baseline for the motion score.
    previous: Option<LandmarkSet>,
    /// When the current still-period began, if one is in progress.
    still_start: Option<Instant>,
}

impl StillnessTrigger {
    pub fn new() -> Self {
        Self::with_thresholds(DEFAULT_MOTION_THRESHOLD, DEFAULT_REQUIRED_STILL)
    }

    pub fn with_thresholds(motion_threshold: f64, required_still: Duration) -> Self {
        Self {
            motion_threshold,
            required_still,
            previous: None,
            still_start: None,
        }
    }

    /// Feeds one frame's detection result to the trigger. Returns `true` when
    /// a capture should fire.
    pub fn evaluate(&mut self, landmarks: Option<&LandmarkSet>, now: Instant) -> bool {
        let Some(landmarks) = landmarks else {
            // No hand this frame. Nothing carries over the gap.
            self.previous = None;
            self.still_start = None;
            return false;
        };

        let Some(previous) = self.previous.replace(landmarks.clone()) else {
            // First sighting after a gap; no baseline to measure motion against.
            return false;
        };

        let motion = landmarks.mean_abs_difference(&previous);

        if motion < self.motion_threshold {
            match self.still_start {
                None => self.still_start = Some(now),
                Some(start) => {
                    if now.duration_since(start) >= self.required_still {
                        // Clear the timer so a hand that keeps holding still
                        // cannot fire again without an intervening reset.
                        self.still_start = None;
                        return true;
                    }
                }
            }
        } else {
            self.still_start = None;
        }

        false
    }
}

impl Default for StillnessTrigger {
    fn default() -> Self {
        Self::new()
    }
}
