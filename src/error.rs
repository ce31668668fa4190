use thiserror::Error;

/// Failures the capture engine can surface to its caller. Both variants mark
/// a single capture attempt as lost; neither tears down the streaming
/// session.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to write capture to disk: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode capture: {0}")]
    Image(#[from] image::error::ImageError),
}
