use std::time::{Duration, Instant};

use chrono::Utc;
use frame_scope_common::config::SourceConfig;
use frame_scope_common::frame::Frame;
use tracing::{debug, info};

use super::{FrameSource, SourceError};

/// Single-frame polling fallback for cameras without a multipart stream
/// endpoint.
///
/// Each `read_frame` sleeps out the remainder of the poll period before
/// fetching, so the source also paces the pipeline loop.
pub struct PollSource {
    client: reqwest::blocking::Client,
    url: String,
    period: Duration,
    last_fetch: Option<Instant>,
    seq: u64,
}

impl PollSource {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(SourceError::HttpConnect)?;
        let fps = if config.fps > 0.0 { config.fps } else { 1.0 };
        info!(url = config.url, fps, "polling source ready");
        Ok(Self {
            client,
            url: config.url.clone(),
            period: Duration::from_secs_f64(1.0 / fps),
            last_fetch: None,
            seq: 0,
        })
    }
}

impl FrameSource for PollSource {
    fn read_frame(&mut self) -> Result<Frame, SourceError> {
        if let Some(last) = self.last_fetch {
            let since = last.elapsed();
            if since < self.period {
                std::thread::sleep(self.period - since);
            }
        }
        self.last_fetch = Some(Instant::now());

        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(SourceError::HttpConnect)?;
        if !response.status().is_success() {
            return Err(SourceError::HttpStatus(response.status().as_u16()));
        }
        let jpeg = response.bytes().map_err(SourceError::HttpBody)?;
        let seq = self.seq;
        self.seq += 1;
        debug!(seq, bytes = jpeg.len(), "fetched frame");
        Ok(Frame::from_jpeg(&jpeg, seq, Utc::now().timestamp_millis())?)
    }
}
