//! Session codec - compact URL-safe encoding of a whole lab session
//!
//! Wire form: `base64url(version || checksum || zstd(json))` with no padding.
//! The checksum is the first eight bytes of SHA-256 over the version byte
//! and the compressed body, so a corrupted payload is rejected before it is
//! decompressed.
//!
//! Decoding is lossy on purpose: every failure becomes `None`. The stage that
//! failed is logged at `debug` for anyone chasing a broken link. Payloads and
//! the JSON they inflate to are size-capped in both directions.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};
use std::io::{self, Read};
use thiserror::Error;

use crate::core::config::{LabConfig, Limits, DEFAULT_COMPRESSION_LEVEL};
use crate::entities::LabSession;

/// Current frame version
pub const WIRE_VERSION: u8 = 1;

/// Query parameter carrying the payload in share links
pub const SHARE_QUERY_PARAM: &str = "session";

/// Longest payload accepted, in base64 characters
pub const MAX_PAYLOAD_LEN: usize = 64 * 1024;

/// Largest session document a payload may inflate to
pub const MAX_JSON_BYTES: usize = 1024 * 1024;

const CHECKSUM_LEN: usize = 8;
const HEADER_LEN: usize = 1 + CHECKSUM_LEN;

/// Where decoding gave up
#[derive(Debug, Error)]
enum DecodeError {
    #[error("empty payload")]
    Empty,

    #[error("not base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("{what} exceeds {limit} bytes")]
    TooLarge { what: &'static str, limit: usize },

    #[error("frame too short ({0} bytes)")]
    TooShort(usize),

    #[error("unsupported wire version {0}")]
    Version(u8),

    #[error("checksum mismatch")]
    Checksum,

    #[error("decompression failed: {0}")]
    Decompress(#[source] io::Error),

    #[error("invalid session document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("session failed validation: {0}")]
    Validation(String),
}

/// Encoder/decoder with explicit compression level and validation limits
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCodec {
    level: i32,
    limits: Limits,
}

impl Default for SessionCodec {
    fn default() -> Self {
        Self {
            level: DEFAULT_COMPRESSION_LEVEL,
            limits: Limits::default(),
        }
    }
}

impl SessionCodec {
    pub fn new(level: i32, limits: Limits) -> Self {
        Self { level, limits }
    }

    pub fn from_config(config: &LabConfig) -> Self {
        Self::new(config.compression_level, config.limits())
    }

    /// Encode a session; returns an empty string if encoding fails
    pub fn encode(&self, session: &LabSession) -> String {
        match self.try_encode(session) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "session encoding failed");
                String::new()
            }
        }
    }

    /// Decode a bare payload or a share link; `None` on any failure
    pub fn decode(&self, input: &str) -> Option<LabSession> {
        match self.try_decode(input) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::debug!(error = %e, "session payload rejected");
                None
            }
        }
    }

    fn try_encode(&self, session: &LabSession) -> io::Result<String> {
        let json = serde_json::to_vec(&session.without_samples())?;
        if json.len() > MAX_JSON_BYTES {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("session document exceeds {} bytes", MAX_JSON_BYTES),
            ));
        }
        let body = zstd::encode_all(&json[..], self.level)?;

        let mut frame = Vec::with_capacity(HEADER_LEN + body.len());
        frame.push(WIRE_VERSION);
        frame.extend_from_slice(&checksum(WIRE_VERSION, &body));
        frame.extend_from_slice(&body);

        tracing::debug!(
            json_bytes = json.len(),
            frame_bytes = frame.len(),
            "encoded session"
        );
        let payload = URL_SAFE_NO_PAD.encode(frame);
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("payload exceeds {} characters", MAX_PAYLOAD_LEN),
            ));
        }
        Ok(payload)
    }

    fn try_decode(&self, input: &str) -> Result<LabSession, DecodeError> {
        let payload = extract_payload(input).ok_or(DecodeError::Empty)?;
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(DecodeError::TooLarge {
                what: "payload",
                limit: MAX_PAYLOAD_LEN,
            });
        }
        let frame = URL_SAFE_NO_PAD.decode(payload)?;
        if frame.len() <= HEADER_LEN {
            return Err(DecodeError::TooShort(frame.len()));
        }

        let (header, body) = frame.split_at(HEADER_LEN);
        let version = header[0];
        if version != WIRE_VERSION {
            return Err(DecodeError::Version(version));
        }
        if header[1..] != checksum(version, body) {
            return Err(DecodeError::Checksum);
        }

        let json = inflate(body)?;
        let session: LabSession = serde_json::from_slice(&json)?;
        session
            .validate(&self.limits)
            .map_err(|e| DecodeError::Validation(e.to_string()))?;
        Ok(session)
    }
}

/// Encode with default settings
pub fn encode(session: &LabSession) -> String {
    SessionCodec::default().encode(session)
}

/// Decode with default settings
pub fn decode(input: &str) -> Option<LabSession> {
    SessionCodec::default().decode(input)
}

/// Build a share link carrying the encoded session
pub fn share_link(base_url: &str, payload: &str) -> String {
    let base = base_url.trim();
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", base, separator, SHARE_QUERY_PARAM, payload)
}

/// Pull the payload out of user input.
///
/// Input containing `?` is treated as a URL and must carry the payload in
/// the `session` query parameter; anything else is taken as a bare payload.
pub fn extract_payload(input: &str) -> Option<&str> {
    let input = input.trim();
    let payload = match input.split_once('?') {
        Some((_, query)) => {
            let query = query.split('#').next().unwrap_or_default();
            query
                .split('&')
                .filter_map(|pair| pair.split_once('='))
                .find(|(key, _)| *key == SHARE_QUERY_PARAM)
                .map(|(_, value)| value)?
        }
        None => input,
    };
    (!payload.is_empty()).then_some(payload)
}

/// Decompress at most `MAX_JSON_BYTES`; anything larger is rejected unread
fn inflate(body: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let decoder = zstd::stream::read::Decoder::new(body).map_err(DecodeError::Decompress)?;
    let mut json = Vec::new();
    decoder
        .take(MAX_JSON_BYTES as u64 + 1)
        .read_to_end(&mut json)
        .map_err(DecodeError::Decompress)?;
    if json.len() > MAX_JSON_BYTES {
        return Err(DecodeError::TooLarge {
            what: "session document",
            limit: MAX_JSON_BYTES,
        });
    }
    Ok(json)
}

fn checksum(version: u8, body: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut hasher = Sha256::new();
    hasher.update([version]);
    hasher.update(body);
    let digest = hasher.finalize();
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[..CHECKSUM_LEN]);
    out
}
