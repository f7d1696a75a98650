pub mod mjpeg;
pub mod poll;

use frame_scope_common::config::SourceConfig;
use frame_scope_common::frame::{Frame, FrameError};

/// Supplies one frame per pipeline tick. `read_frame` blocks and is the
/// loop's only wait point.
pub trait FrameSource {
    fn read_frame(&mut self) -> Result<Frame, SourceError>;
}

impl FrameSource for Box<dyn FrameSource> {
    fn read_frame(&mut self) -> Result<Frame, SourceError> {
        (**self).read_frame()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP connection failed: {0}")]
    HttpConnect(reqwest::Error),
    #[error("HTTP status {0}")]
    HttpStatus(u16),
    #[error("HTTP body read failed: {0}")]
    HttpBody(reqwest::Error),
    #[error("stream read failed: {0}")]
    StreamRead(std::io::Error),
    #[error("stream ended")]
    Disconnected,
    #[error("unknown source mode {0:?}, expected \"mjpeg\" or \"poll\"")]
    UnknownMode(String),
    #[error("bad frame: {0}")]
    BadFrame(#[from] FrameError),
}

impl SourceError {
    /// An undecodable frame skips the current tick; everything else stops
    /// the pipeline.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SourceError::BadFrame(_))
    }
}

/// Build the configured source.
pub fn make_source(config: &SourceConfig) -> Result<Box<dyn FrameSource>, SourceError> {
    match config.mode.as_str() {
        "mjpeg" => Ok(Box::new(mjpeg::MjpegSource::connect(config)?)),
        "poll" => Ok(Box::new(poll::PollSource::new(config)?)),
        other => Err(SourceError::UnknownMode(other.to_string())),
    }
}
