// THEORY:
// The `SessionContext` holds the only cross-invocation shared mutable state
// in the system: the most recently received frame, written by the per-frame
// callback and read by the independently-triggered manual-capture action.
//
// Key architectural principles:
// 1.  **Swap, Never Mutate**: The frame slot holds an `Arc` that is swapped
//     whole under a short lock. A manual capture either sees the previous
//     complete frame or the new complete frame, never a half-written one.
// 2.  **Latched Requests**: A manual-capture request from the UI is latched
//     as a flag and serviced on the next poll, mirroring how the host
//     framework delivers button presses out of band with the video stream.
// 3.  **Session Lifetime**: The context lives as long as one streaming
//     session; nothing in it is persisted.

use image::RgbImage;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared per-session state: the last received frame and any pending
/// manual-capture request.
#[derive(Default)]
pub struct SessionContext {
    last_frame: Mutex<Option<Arc<RgbImage>>>,
    capture_requested: AtomicBool,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a copy of the current frame, replacing the previous one. Called
    /// once per frame by the streaming callback.
    pub fn store_frame(&self, frame: RgbImage) {
        *self.last_frame.lock() = Some(Arc::new(frame));
    }

    /// The most recently received frame, if any frame has arrived yet.
    pub fn latest_frame(&self) -> Option<Arc<RgbImage>> {
        self.last_frame.lock().clone()
    }

    /// Whether at least one frame has been received. The UI uses this to
    /// gate its capture control.
    pub fn has_frame(&self) -> bool {
        self.last_frame.lock().is_some()
    }

    /// Latches a manual-capture request to be serviced on the next poll.
    pub fn request_capture(&self) {
        self.capture_requested.store(true, Ordering::SeqCst);
    }

    /// Consumes a pending manual-capture request, if one was latched.
    pub fn take_capture_request(&self) -> bool {
        self.capture_requested.swap(false, Ordering::SeqCst)
    }
}
