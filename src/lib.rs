// THEORY:
// This file is the main entry point for the `mano_capture` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the public
// API that will be exposed to external consumers (the host media transport and
// UI shell).
//
// The primary goal is to export the `CapturePipeline` and its associated data
// structures (`CaptureConfig`, `Report`, `SessionContext`, the `HandDetector`
// seam) as the clean, high-level interface for the capture engine. The internal
// modules (`core_modules`) are encapsulated behind it, providing a clean
// separation of concerns.

pub mod core_modules;
pub mod error;
pub mod pipeline;
pub mod session;

pub use error::CaptureError;
pub use pipeline::{
    CaptureConfig, CaptureData, CapturePipeline, ManualCaptureOutcome, Report,
};
pub use session::SessionContext;
