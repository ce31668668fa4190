// THEORY:
// The `pipeline` module is the final, top-level API for the capture engine.
// It encapsulates the full stack — detector seam, stillness trigger,
// stylizer, and persistence — into a single per-frame entry point. The host
// media transport calls `process_frame` once per delivered frame; the UI
// shell calls `manual_capture` (directly or via the latched session request)
// whenever the operator asks for a shot.

use crate::core_modules::image_io::save_capture;
use crate::core_modules::landmarks::HandDetector;
use crate::core_modules::stillness::StillnessTrigger;
use crate::core_modules::stylizer::{Stylizer, StylizerConfig};
use crate::error::CaptureError;
use crate::session::SessionContext;
use chrono::Local;
use image::RgbImage;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

// Re-export the key data structures for the public API.
pub use crate::core_modules::landmarks::{HAND_LANDMARK_COUNT, Landmark, LandmarkSet};

/// Configuration for the CapturePipeline, allowing for tunable behavior.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Landmark motion scores below this count as "still."
    pub motion_threshold: f64,
    /// How long the hand must hold still before an automatic capture.
    pub required_still: Duration,
    /// Where capture files are written. Created on first capture if absent.
    pub output_dir: PathBuf,
    /// Parameters of the deterministic stylization pipeline.
    pub stylizer: StylizerConfig,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            motion_threshold: 0.005,
            required_still: Duration::from_millis(2000),
            output_dir: PathBuf::from("capturas"),
            stylizer: StylizerConfig::default(),
        }
    }
}

/// The detailed data package for a completed capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureData {
    /// Where the stylized still was written.
    pub path: PathBuf,
}

/// The primary output of the pipeline for a single frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    NoCapture,
    Captured(CaptureData),
}

/// The outcome of a manual capture request.
#[derive(Debug, Clone, PartialEq)]
pub enum ManualCaptureOutcome {
    Saved(PathBuf),
    /// No frame has arrived yet; nothing was written. A user-facing warning,
    /// not an error.
    NoFrameYet,
}

/// The main, top-level struct for the capture engine.
pub struct CapturePipeline {
    detector: Box<dyn HandDetector>,
    trigger: StillnessTrigger,
    stylizer: Stylizer,
    output_dir: PathBuf,
    session: Arc<SessionContext>,
}

impl CapturePipeline {
    pub fn new(config: CaptureConfig, detector: Box<dyn HandDetector>) -> Self {
        let trigger =
            StillnessTrigger::with_thresholds(config.motion_threshold, config.required_still);
        Self {
            detector,
            trigger,
            stylizer: Stylizer::new(config.stylizer),
            output_dir: config.output_dir,
            session: Arc::new(SessionContext::new()),
        }
    }

    /// The shared session state, for wiring up the UI shell's manual-capture
    /// control and readiness indicator.
    pub fn session(&self) -> Arc<SessionContext> {
        Arc::clone(&self.session)
    }

    /// The per-frame callback body. Stores the frame for manual capture, runs
    /// the detector and the stillness trigger, and on a trigger fire writes a
    /// stylized still to disk.
    pub fn process_frame(
        &mut self,
        frame: &RgbImage,
        now: Instant,
    ) -> Result<Report, CaptureError> {
        // Stage 1: publish the frame for the manual-capture path.
        self.session.store_frame(frame.clone());

        // Stage 2: hand detection (delegated to the injected model).
        let landmarks = self.detector.detect(frame);

        // Stage 3: stillness decision.
        if !self.trigger.evaluate(landmarks.as_ref(), now) {
            return Ok(Report::NoCapture);
        }

        // Stage 4: stylize and persist the current frame.
        let styled = self.stylizer.stylize(frame);
        let path = save_capture(&self.output_dir, &styled, Local::now().naive_local())?;
        info!("automatic capture saved to {}", path.display());

        Ok(Report::Captured(CaptureData { path }))
    }

    /// Captures the most recently received frame on operator request. With no
    /// frame yet this is a warning-level no-op, never an error.
    pub fn manual_capture(&self) -> Result<ManualCaptureOutcome, CaptureError> {
        let Some(frame) = self.session.latest_frame() else {
            warn!("manual capture requested before any frame arrived");
            return Ok(ManualCaptureOutcome::NoFrameYet);
        };

        let styled = self.stylizer.stylize(&frame);
        let path = save_capture(&self.output_dir, &styled, Local::now().naive_local())?;
        info!("manual capture saved to {}", path.display());

        Ok(ManualCaptureOutcome::Saved(path))
    }

    /// Services a latched manual-capture request, if the UI has raised one
    /// since the last poll.
    pub fn service_capture_request(&self) -> Result<Option<ManualCaptureOutcome>, CaptureError> {
        if self.session.take_capture_request() {
            self.manual_capture().map(Some)
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// A scripted stand-in for the pretrained model: plays back a fixed
    /// sequence of detection results.
    struct ScriptedDetector {
        script: Vec<Option<LandmarkSet>>,
        cursor: usize,
    }

    impl ScriptedDetector {
        fn new(script: Vec<Option<LandmarkSet>>) -> Self {
            Self { script, cursor: 0 }
        }

        fn repeating(result: Option<LandmarkSet>, frames: usize) -> Self {
            Self::new(vec![result; frames])
        }
    }

    impl HandDetector for ScriptedDetector {
        fn detect(&mut self, _frame: &RgbImage) -> Option<LandmarkSet> {
            let result = self.script.get(self.cursor).cloned().flatten();
            self.cursor += 1;
            result
        }
    }

    fn still_hand() -> LandmarkSet {
        LandmarkSet::from_points(vec![Landmark::new(0.5, 0.5, 0.0); HAND_LANDMARK_COUNT]).unwrap()
    }

    fn test_frame() -> RgbImage {
        RgbImage::from_fn(320, 240, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 80]))
    }

    fn test_config(dir: &std::path::Path) -> CaptureConfig {
        CaptureConfig {
            output_dir: dir.join("capturas"),
            ..CaptureConfig::default()
        }
    }

    #[test]
    fn still_hand_triggers_exactly_one_capture() {
        let dir = tempfile::tempdir().expect("tempdir");
        let detector = ScriptedDetector::repeating(Some(still_hand()), 100);
        let mut pipeline = CapturePipeline::new(test_config(dir.path()), Box::new(detector));

        let frame = test_frame();
        let t0 = Instant::now();
        let mut captures = 0;

        // ~2.3 seconds of motionless hand at 30 fps: the trigger matures once.
        for i in 0..70u64 {
            let now = t0 + Duration::from_millis(i * 33);
            if let Report::Captured(data) = pipeline.process_frame(&frame, now).expect("frame") {
                captures += 1;
                assert!(data.path.exists());
                let name = data.path.file_name().unwrap().to_string_lossy().into_owned();
                assert!(name.starts_with("mano_") && name.ends_with(".jpg"), "{name}");
            }
        }
        assert_eq!(captures, 1);
    }

    #[test]
    fn moving_hand_never_captures() {
        let dir = tempfile::tempdir().expect("tempdir");
        // Every frame shifts all coordinates by 0.01, twice the threshold.
        let script: Vec<Option<LandmarkSet>> = (0..70)
            .map(|i| {
                let v = 0.1 + 0.01 * i as f64;
                LandmarkSet::from_points(vec![Landmark::new(v, v, v); HAND_LANDMARK_COUNT])
            })
            .collect();
        let mut pipeline = CapturePipeline::new(
            test_config(dir.path()),
            Box::new(ScriptedDetector::new(script)),
        );

        let frame = test_frame();
        let t0 = Instant::now();
        for i in 0..70u64 {
            let now = t0 + Duration::from_millis(i * 33);
            assert_eq!(
                pipeline.process_frame(&frame, now).expect("frame"),
                Report::NoCapture
            );
        }
        assert!(!dir.path().join("capturas").exists());
    }

    #[test]
    fn no_hand_never_captures() {
        let dir = tempfile::tempdir().expect("tempdir");
        let detector = ScriptedDetector::repeating(None, 70);
        let mut pipeline = CapturePipeline::new(test_config(dir.path()), Box::new(detector));

        let frame = test_frame();
        let t0 = Instant::now();
        for i in 0..70u64 {
            let now = t0 + Duration::from_millis(i * 33);
            assert_eq!(
                pipeline.process_frame(&frame, now).expect("frame"),
                Report::NoCapture
            );
        }
        assert!(!dir.path().join("capturas").exists());
    }

    #[test]
    fn manual_capture_without_a_frame_is_a_noop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let detector = ScriptedDetector::repeating(None, 0);
        let pipeline = CapturePipeline::new(test_config(dir.path()), Box::new(detector));

        let outcome = pipeline.manual_capture().expect("manual capture");
        assert_eq!(outcome, ManualCaptureOutcome::NoFrameYet);
        // Zero writes: the output directory was never even created.
        assert!(!dir.path().join("capturas").exists());
    }

    #[test]
    fn manual_capture_uses_the_latest_frame() {
        let dir = tempfile::tempdir().expect("tempdir");
        let detector = ScriptedDetector::repeating(None, 10);
        let mut pipeline = CapturePipeline::new(test_config(dir.path()), Box::new(detector));

        pipeline
            .process_frame(&test_frame(), Instant::now())
            .expect("frame");

        match pipeline.manual_capture().expect("manual capture") {
            ManualCaptureOutcome::Saved(path) => {
                assert!(path.exists());
                let decoded = image::open(&path).expect("reopen").to_luma8();
                assert_eq!(decoded.dimensions(), (28, 28));
            }
            other => panic!("expected a saved capture, got {other:?}"),
        }
    }

    #[test]
    fn latched_request_is_serviced_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let detector = ScriptedDetector::repeating(None, 10);
        let mut pipeline = CapturePipeline::new(test_config(dir.path()), Box::new(detector));

        pipeline
            .process_frame(&test_frame(), Instant::now())
            .expect("frame");

        assert!(pipeline.service_capture_request().expect("poll").is_none());

        pipeline.session().request_capture();
        let outcome = pipeline.service_capture_request().expect("poll");
        assert!(matches!(outcome, Some(ManualCaptureOutcome::Saved(_))));

        // The latch was consumed.
        assert!(pipeline.service_capture_request().expect("poll").is_none());
    }
}
