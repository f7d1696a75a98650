use std::io::Read;
use std::time::Duration;

use bytes::BytesMut;
use chrono::Utc;
use frame_scope_common::config::SourceConfig;
use frame_scope_common::frame::Frame;
use tracing::{debug, info};

use super::{FrameSource, SourceError};

const BOUNDARY: &[u8] = b"--frame\r\n";
const HEADER_END: &[u8] = b"\r\n\r\n";
const READ_CHUNK: usize = 16 * 1024;

/// Parse state for the MJPEG multipart stream.
enum ParseState {
    /// Looking for the boundary marker `--frame\r\n`.
    SeekingBoundary,
    /// Found boundary, now looking for end of headers `\r\n\r\n`.
    SeekingHeaderEnd,
    /// Collecting JPEG bytes until the next boundary.
    CollectingJpeg,
}

/// Incremental splitter for an MJPEG multipart body. Push raw chunks in,
/// pull complete JPEG payloads out.
struct MjpegAssembler {
    buffer: BytesMut,
    state: ParseState,
    /// Resume point for the boundary scan, to avoid re-scanning payload
    /// bytes that already came up empty.
    jpeg_scan_from: usize,
}

impl MjpegAssembler {
    fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(256 * 1024),
            state: ParseState::SeekingBoundary,
            jpeg_scan_from: 0,
        }
    }

    fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// The next complete JPEG payload, if the buffer holds one.
    fn next_jpeg(&mut self) -> Option<Vec<u8>> {
        loop {
            match self.state {
                ParseState::SeekingBoundary => {
                    if let Some(pos) = find_subsequence(&self.buffer, BOUNDARY) {
                        // Discard everything up to and including the boundary
                        let _ = self.buffer.split_to(pos + BOUNDARY.len());
                        self.state = ParseState::SeekingHeaderEnd;
                    } else {
                        // Keep last few bytes in case the boundary spans chunks
                        if self.buffer.len() > BOUNDARY.len() {
                            let _ = self.buffer.split_to(self.buffer.len() - BOUNDARY.len());
                        }
                        return None;
                    }
                }
                ParseState::SeekingHeaderEnd => {
                    if let Some(pos) = find_subsequence(&self.buffer, HEADER_END) {
                        // Discard headers
                        let _ = self.buffer.split_to(pos + HEADER_END.len());
                        self.jpeg_scan_from = 0;
                        self.state = ParseState::CollectingJpeg;
                    } else {
                        return None;
                    }
                }
                ParseState::CollectingJpeg => {
                    if let Some(pos) = find_subsequence(&self.buffer[self.jpeg_scan_from..], BOUNDARY)
                    {
                        let jpeg_end = self.jpeg_scan_from + pos;
                        // Strip the trailing \r\n before the boundary
                        let end = if jpeg_end >= 2
                            && &self.buffer[jpeg_end - 2..jpeg_end] == b"\r\n"
                        {
                            jpeg_end - 2
                        } else {
                            jpeg_end
                        };
                        let jpeg = self.buffer[..end].to_vec();

                        let _ = self.buffer.split_to(jpeg_end + BOUNDARY.len());
                        self.jpeg_scan_from = 0;
                        self.state = ParseState::SeekingHeaderEnd;

                        if jpeg.is_empty() {
                            continue;
                        }
                        return Some(jpeg);
                    }
                    // No boundary yet, remember where to resume scanning
                    self.jpeg_scan_from = self.buffer.len().saturating_sub(BOUNDARY.len());
                    return None;
                }
            }
        }
    }
}

/// Blocking MJPEG-over-HTTP frame source.
///
/// Connects once at construction; each `read_frame` call reads from the
/// open response body until the assembler yields the next JPEG, then
/// decodes it. End-of-body is a fatal `Disconnected`.
pub struct MjpegSource {
    response: reqwest::blocking::Response,
    assembler: MjpegAssembler,
    chunk: Vec<u8>,
    seq: u64,
}

impl MjpegSource {
    pub fn connect(config: &SourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            // The multipart body never ends on its own; disable the
            // whole-request timeout.
            .timeout(None)
            .build()
            .map_err(SourceError::HttpConnect)?;
        let response = client
            .get(&config.url)
            .send()
            .map_err(SourceError::HttpConnect)?;
        if !response.status().is_success() {
            return Err(SourceError::HttpStatus(response.status().as_u16()));
        }
        info!(url = config.url, status = %response.status(), "connected to MJPEG stream");
        Ok(Self {
            response,
            assembler: MjpegAssembler::new(),
            chunk: vec![0; READ_CHUNK],
            seq: 0,
        })
    }
}

impl FrameSource for MjpegSource {
    fn read_frame(&mut self) -> Result<Frame, SourceError> {
        loop {
            if let Some(jpeg) = self.assembler.next_jpeg() {
                let seq = self.seq;
                self.seq += 1;
                debug!(seq, bytes = jpeg.len(), "frame extracted from stream");
                return Ok(Frame::from_jpeg(&jpeg, seq, Utc::now().timestamp_millis())?);
            }
            let n = self
                .response
                .read(&mut self.chunk)
                .map_err(SourceError::StreamRead)?;
            if n == 0 {
                return Err(SourceError::Disconnected);
            }
            self.assembler.push(&self.chunk[..n]);
        }
    }
}

/// Find the position of `needle` in `haystack`.
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(payload: &[u8]) -> Vec<u8> {
        let mut v = Vec::new();
        v.extend_from_slice(BOUNDARY);
        v.extend_from_slice(b"Content-Type: image/jpeg\r\nContent-Length: 0\r\n\r\n");
        v.extend_from_slice(payload);
        v.extend_from_slice(b"\r\n");
        v
    }

    #[test]
    fn extracts_a_single_payload() {
        let mut asm = MjpegAssembler::new();
        asm.push(&part(b"AAAA"));
        asm.push(BOUNDARY);
        assert_eq!(asm.next_jpeg().as_deref(), Some(&b"AAAA"[..]));
        assert_eq!(asm.next_jpeg(), None);
    }

    #[test]
    fn extracts_consecutive_payloads() {
        let mut asm = MjpegAssembler::new();
        asm.push(&part(b"first"));
        asm.push(&part(b"second"));
        asm.push(BOUNDARY);
        assert_eq!(asm.next_jpeg().as_deref(), Some(&b"first"[..]));
        assert_eq!(asm.next_jpeg().as_deref(), Some(&b"second"[..]));
        assert_eq!(asm.next_jpeg(), None);
    }

    #[test]
    fn handles_boundaries_split_across_chunks() {
        let mut stream = Vec::new();
        stream.extend_from_slice(&part(b"first"));
        stream.extend_from_slice(&part(b"second"));
        stream.extend_from_slice(BOUNDARY);

        let mut asm = MjpegAssembler::new();
        let mut got = Vec::new();
        for chunk in stream.chunks(3) {
            asm.push(chunk);
            while let Some(jpeg) = asm.next_jpeg() {
                got.push(jpeg);
            }
        }
        assert_eq!(got, vec![b"first".to_vec(), b"second".to_vec()]);
    }

    #[test]
    fn leading_junk_before_the_first_boundary_is_dropped() {
        let mut asm = MjpegAssembler::new();
        asm.push(b"HTTP noise that is not a boundary");
        asm.push(&part(b"payload"));
        asm.push(BOUNDARY);
        assert_eq!(asm.next_jpeg().as_deref(), Some(&b"payload"[..]));
    }

    #[test]
    fn empty_payloads_are_skipped() {
        let mut asm = MjpegAssembler::new();
        asm.push(&part(b""));
        asm.push(&part(b"real"));
        asm.push(BOUNDARY);
        assert_eq!(asm.next_jpeg().as_deref(), Some(&b"real"[..]));
    }

    #[test]
    fn incomplete_part_yields_nothing() {
        let mut asm = MjpegAssembler::new();
        asm.push(BOUNDARY);
        asm.push(b"Content-Type: image/jpeg\r\n\r\npartial payload");
        assert_eq!(asm.next_jpeg(), None);
    }
}
