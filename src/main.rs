// This binary is an example of how to use the `mano_capture` library.
// The library entry point is `src/lib.rs`.
//
// A real host would wire `process_frame` into its media transport's per-frame
// callback and `request_capture` into a UI button. Here a synthetic frame
// source and a scripted detector stand in for both, so the whole engine can
// be exercised end to end without a camera.

use anyhow::Result;
use image::{Rgb, RgbImage};
use log::info;
use mano_capture::pipeline::{HAND_LANDMARK_COUNT, Landmark, LandmarkSet};
use mano_capture::{CaptureConfig, CapturePipeline, ManualCaptureOutcome, Report};
use mano_capture::core_modules::landmarks::HandDetector;
use std::time::{Duration, Instant};

const FRAMES: u64 = 120;
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// A stand-in for the pretrained model: reports a hand that drifts for the
/// first second, then freezes in place.
struct DriftingHand {
    frame_index: u64,
}

impl HandDetector for DriftingHand {
    fn detect(&mut self, _frame: &RgbImage) -> Option<LandmarkSet> {
        let drift = 0.01 * self.frame_index.min(30) as f64;
        self.frame_index += 1;
        LandmarkSet::from_points(vec![
            Landmark::new(0.4 + drift, 0.5, 0.0);
            HAND_LANDMARK_COUNT
        ])
    }
}

fn synthetic_frame(index: u64) -> RgbImage {
    RgbImage::from_fn(640, 480, |x, y| {
        let shade = ((x + y + index as u32 * 3) % 256) as u8;
        Rgb([shade, shade / 2, 255 - shade])
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let detector = DriftingHand { frame_index: 0 };
    let mut pipeline = CapturePipeline::new(CaptureConfig::default(), Box::new(detector));
    let session = pipeline.session();

    let start = Instant::now();
    for i in 0..FRAMES {
        let frame = synthetic_frame(i);
        let now = start + FRAME_INTERVAL * i as u32;

        match pipeline.process_frame(&frame, now)? {
            Report::Captured(data) => info!("frame {i}: captured {}", data.path.display()),
            Report::NoCapture => {}
        }
    }

    // Simulate the operator pressing the capture button.
    session.request_capture();
    if let Some(ManualCaptureOutcome::Saved(path)) = pipeline.service_capture_request()? {
        info!("manual capture saved to {}", path.display());
    }

    Ok(())
}
