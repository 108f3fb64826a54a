//! PlantUML text encoding.
//!
//! DESIGN
//! ======
//! The rendering service addresses a diagram by its source, compressed with
//! raw DEFLATE and written in PlantUML's own base-64 variant. The alphabet
//! is `0-9A-Za-z-_`, so a token can sit in a URL path segment unescaped.
//! Every 3-byte group (the last one zero-padded) becomes exactly four
//! characters.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use tracing::warn;

const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";

/// Errors produced when turning a token back into diagram source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid token character {ch:?} at offset {offset}")]
    InvalidChar { ch: char, offset: usize },

    #[error("token is not valid deflate data: {0}")]
    Inflate(String),

    #[error("decoded source is not UTF-8")]
    NotUtf8,
}

/// Encode diagram source into a render-service token.
///
/// Deterministic and side-effect free. Any text, including the empty
/// string, has a token.
#[must_use]
pub fn encode(document: &str) -> String {
    encode_bytes(&deflate_raw(document.as_bytes()))
}

/// Decode a render-service token back into diagram source.
///
/// # Errors
///
/// Returns [`DecodeError`] if the token uses characters outside the
/// PlantUML alphabet, does not inflate, or inflates to non-UTF-8 bytes.
pub fn decode(token: &str) -> Result<String, DecodeError> {
    let compressed = decode_bytes(token)?;
    let mut inflater = DeflateDecoder::new(compressed.as_slice());
    let mut raw = Vec::new();
    inflater
        .read_to_end(&mut raw)
        .map_err(|e| DecodeError::Inflate(e.to_string()))?;
    String::from_utf8(raw).map_err(|_| DecodeError::NotUtf8)
}

fn deflate_raw(input: &[u8]) -> Vec<u8> {
    let mut deflater = DeflateEncoder::new(Vec::with_capacity(input.len() / 2 + 16), Compression::best());
    match deflater.write_all(input).and_then(|()| deflater.finish()) {
        Ok(compressed) => compressed,
        Err(e) => {
            warn!(error = %e, "deflate failed; emitting stored blocks");
            deflate_stored(input)
        }
    }
}

/// Raw DEFLATE made only of stored (uncompressed) blocks. Valid for any
/// input, so every document still gets a decodable token.
fn deflate_stored(input: &[u8]) -> Vec<u8> {
    let blocks = input.len() / usize::from(u16::MAX) + 1;
    let mut out = Vec::with_capacity(input.len() + blocks * 5);
    let mut rest = input;
    loop {
        // A stored block holds at most u16::MAX bytes.
        let len = u16::try_from(rest.len()).unwrap_or(u16::MAX);
        let (block, tail) = rest.split_at(usize::from(len));
        let last = tail.is_empty();
        // BFINAL in bit 0, BTYPE=00, rest of the header byte is padding.
        out.push(u8::from(last));
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&(!len).to_le_bytes());
        out.extend_from_slice(block);
        if last {
            return out;
        }
        rest = tail;
    }
}

fn encode_bytes(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(3) * 4);
    for chunk in data.chunks(3) {
        let b1 = chunk[0];
        let b2 = chunk.get(1).copied().unwrap_or(0);
        let b3 = chunk.get(2).copied().unwrap_or(0);
        push_group(&mut out, b1, b2, b3);
    }
    out
}

fn push_group(out: &mut String, b1: u8, b2: u8, b3: u8) {
    let sextets = [
        b1 >> 2,
        ((b1 & 0x3) << 4) | (b2 >> 4),
        ((b2 & 0xF) << 2) | (b3 >> 6),
        b3 & 0x3F,
    ];
    for s in sextets {
        out.push(char::from(ALPHABET[usize::from(s)]));
    }
}

fn sextet(ch: char, offset: usize) -> Result<u8, DecodeError> {
    let invalid = DecodeError::InvalidChar { ch, offset };
    let Ok(byte) = u8::try_from(ch) else {
        return Err(invalid);
    };
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'A'..=b'Z' => Ok(byte - b'A' + 10),
        b'a'..=b'z' => Ok(byte - b'a' + 36),
        b'-' => Ok(62),
        b'_' => Ok(63),
        _ => Err(invalid),
    }
}

fn decode_bytes(token: &str) -> Result<Vec<u8>, DecodeError> {
    let chars: Vec<char> = token.chars().collect();
    let mut out = Vec::with_capacity(chars.len() / 4 * 3);
    for (group, chunk) in chars.chunks(4).enumerate() {
        let mut s = [0u8; 4];
        for (i, &ch) in chunk.iter().enumerate() {
            s[i] = sextet(ch, group * 4 + i)?;
        }
        out.push((s[0] << 2) | (s[1] >> 4));
        out.push(((s[1] & 0xF) << 4) | (s[2] >> 2));
        out.push(((s[2] & 0x3) << 6) | s[3]);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "encoder_test.rs"]
mod tests;
