// THEORY:
// The `landmarks` module is the data layer between the external hand-landmark
// detector and the rest of the capture engine. The detector itself (a pretrained
// model) lives outside this crate; what crosses the boundary is a per-frame,
// optional set of normalized joint positions.
//
// Key architectural principles:
// 1.  **Opaque Capability**: The detector is modeled as the `HandDetector` trait
//     with a single operation. The engine never knows which model produced the
//     points, and tests drive the pipeline with scripted implementations.
// 2.  **Validated Construction**: A `LandmarkSet` can only be built from exactly
//     21 points. A model that reports a partial hand degrades to "no hand
//     detected" for that frame instead of poisoning downstream motion math.
// 3.  **Immediate Consumption**: A set is compared against the previous frame's
//     set once and then replaces it. Nothing here accumulates history; that is
//     the `StillnessTrigger`'s job.

use image::RgbImage;

/// The number of joints the hand model reports for a single detected hand.
pub const HAND_LANDMARK_COUNT: usize = 21;

/// One normalized joint position. `x` and `y` are in `[0, 1]` relative to the
/// frame; `z` is the model's relative depth estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// An ordered set of exactly [`HAND_LANDMARK_COUNT`] joint positions for one
/// detected hand in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    /// Builds a set from a raw detector report. Returns `None` unless exactly
    /// 21 points were reported, so malformed detections read as "no hand."
    pub fn from_points(points: Vec<Landmark>) -> Option<Self> {
        if points.len() == HAND_LANDMARK_COUNT {
            Some(Self { points })
        } else {
            None
        }
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }

    /// The motion score between two frames: the mean absolute difference over
    /// all 21 points and all 3 coordinates (63 scalar differences averaged).
    pub fn mean_abs_difference(&self, other: &Self) -> f64 {
        let total: f64 = self
            .points
            .iter()
            .zip(other.points.iter())
            .map(|(a, b)| (a.x - b.x).abs() + (a.y - b.y).abs() + (a.z - b.z).abs())
            .sum();
        total / (HAND_LANDMARK_COUNT as f64 * 3.0)
    }
}

/// The seam to the external pretrained hand model: one frame in, at most one
/// hand's landmarks out. Implementations may keep internal tracking state.
pub trait HandDetector {
    fn detect(&mut self, frame: &RgbImage) -> Option<LandmarkSet>;
}
