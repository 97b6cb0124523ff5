//! Stream payload extraction and Flate decompression.

use std::sync::LazyLock;

use flate2::{Decompress, FlushDecompress, Status};
use regex::bytes::Regex;

static STREAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s-u)stream\r?\n(.*?)(?:\r?\n)?endstream").expect("valid stream regex")
});

const FLATE_MARKER: &[u8] = b"/FlateDecode";

/// How the payload bytes of a stream were turned into [`DecodedStream::data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// The object carried no `/FlateDecode` filter; payload used as-is.
    Uncompressed,
    /// Inflated with a zlib header and checksum.
    Zlib,
    /// Inflated as headerless deflate after zlib framing failed.
    RawDeflate,
    /// Flagged as Flate but neither framing inflated; payload used as-is.
    Passthrough,
}

/// Decoded stream contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedStream {
    pub data: Vec<u8>,
    pub framing: Framing,
    /// Set when inflated output was cut at the configured byte cap.
    pub truncated: bool,
}

impl DecodedStream {
    /// Returns true when a Flate-flagged stream could not be inflated.
    pub fn is_fallback(&self) -> bool {
        self.framing == Framing::Passthrough
    }
}

/// Raw bytes between `stream<EOL>` and `endstream` in an object body.
///
/// An end-of-line directly before `endstream` is not part of the payload.
/// Returns `None` when the body has no stream keyword followed by an EOL.
pub fn stream_payload(body: &[u8]) -> Option<&[u8]> {
    STREAM_RE
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_bytes())
}

/// Extract and, when flagged, decompress the stream of an object body.
///
/// Flate-flagged payloads try zlib framing, then raw deflate, then fall back
/// to the raw bytes. Inflated output longer than `max_bytes` is truncated.
/// Never fails; `None` only means the body has no stream.
pub fn decode_stream(body: &[u8], max_bytes: usize) -> Option<DecodedStream> {
    let payload = stream_payload(body)?;

    if !contains(body, FLATE_MARKER) {
        return Some(DecodedStream {
            data: payload.to_vec(),
            framing: Framing::Uncompressed,
            truncated: false,
        });
    }

    if let Some((data, truncated)) = inflate(payload, true, max_bytes) {
        return Some(DecodedStream {
            data,
            framing: Framing::Zlib,
            truncated,
        });
    }
    if let Some((data, truncated)) = inflate(payload, false, max_bytes) {
        return Some(DecodedStream {
            data,
            framing: Framing::RawDeflate,
            truncated,
        });
    }

    #[cfg(feature = "tracing")]
    tracing::warn!(len = payload.len(), "flate stream did not inflate, using raw bytes");

    Some(DecodedStream {
        data: payload.to_vec(),
        framing: Framing::Passthrough,
        truncated: false,
    })
}

/// Inflate `payload` completely, keeping at most `max_bytes` of output.
///
/// Input that ends before the final deflate block counts as a failure.
fn inflate(payload: &[u8], zlib_header: bool, max_bytes: usize) -> Option<(Vec<u8>, bool)> {
    let mut decoder = Decompress::new(zlib_header);
    let mut out: Vec<u8> = Vec::new();

    loop {
        if out.len() > max_bytes {
            out.truncate(max_bytes);
            return Some((out, true));
        }
        if out.len() == out.capacity() {
            let room = max_bytes.saturating_add(1) - out.len();
            out.reserve(out.len().max(payload.len()).max(1024).min(room));
        }

        let consumed = usize::try_from(decoder.total_in()).ok()?;
        let produced = decoder.total_out();
        let input = payload.get(consumed..)?;
        match decoder
            .decompress_vec(input, &mut out, FlushDecompress::Finish)
            .ok()?
        {
            Status::StreamEnd => {
                let truncated = out.len() > max_bytes;
                out.truncate(max_bytes);
                return Some((out, truncated));
            }
            Status::Ok | Status::BufError => {
                let stalled = decoder.total_out() == produced
                    && decoder.total_in() == consumed as u64
                    && out.len() < out.capacity();
                if stalled {
                    return None;
                }
            }
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
