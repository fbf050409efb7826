//! # lz-string encoder and decoder
//!
//! This crate compresses text into the lz-string format and back. The format is a dictionary
//! coder over UTF-16 code units, written as a dense bit stream and usually transported as base64
//! so that it can be embedded in URLs or browser storage. Output is byte-for-byte compatible with
//! other implementations of the format.
//!
//! Every field of the stream is an index into an adaptive dictionary, transmitted least
//! significant bit first. Three indices are reserved as control codes:
//!
//!  * `0`: an 8-bit literal follows
//!  * `1`: a 16-bit literal follows
//!  * `2`: end of stream
//!
//! The width of index fields starts at two bits and grows as the dictionary does. The decoder
//! stops at the end code, never at the end of its input.
//!
//! Exemplary use of the transport helpers:
//!
//! ```
//! let packed = lzstring::compress_to_base64("I have some string to be compressed");
//! assert_eq!(packed, "JIAgFghgbgpiDOB7AtneAXATgSwHYHMR1EQAjOAYxQAdMZ54YATIAA==");
//!
//! let text = lzstring::decompress_from_base64(&packed).unwrap();
//! assert_eq!(text, "I have some string to be compressed");
//! ```
//!
//! The [`encode::Encoder`] and [`decode::Decoder`] give access to the raw byte stream over
//! sequences of code units, which is exact even for text that is not valid UTF-16.
#![forbid(unsafe_code)]

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Alias for a dictionary index.
pub type Code = u32;

/// Introduces a literal code unit below 256.
pub(crate) const LITERAL_8: Code = 0;
/// Introduces a literal of a full code unit.
pub(crate) const LITERAL_16: Code = 1;
/// Terminates the stream.
pub(crate) const END_OF_STREAM: Code = 2;
/// The first index available to dictionary entries.
pub(crate) const FIRST_CODE: Code = 3;

pub mod bits;
pub mod decode;
pub mod dict;
pub mod encode;
mod error;

pub use crate::error::{LzError, Result};

/// Compress a sequence of code units into the raw byte stream.
pub fn compress(units: &[u16]) -> Vec<u8> {
    let mut encoder = encode::Encoder::new();
    encoder.encode_units(units);
    encoder.finish()
}

/// Decompress a raw byte stream into code units.
pub fn decompress(data: &[u8]) -> Result<Vec<u16>> {
    decode::Decoder::new().decode_units(data)
}

/// Compress text as its UTF-16 code units.
pub fn compress_str(text: &str) -> Vec<u8> {
    let units: Vec<u16> = text.encode_utf16().collect();
    compress(&units)
}

/// Decompress a raw byte stream into text.
///
/// Unpaired surrogates in the decoded code units are replaced with U+FFFD. Use [`decompress`]
/// when the exact code units matter.
pub fn decompress_to_string(data: &[u8]) -> Result<String> {
    let units = decompress(data)?;
    Ok(String::from_utf16_lossy(&units))
}

/// Compress text and frame it as standard, padded base64.
pub fn compress_to_base64(text: &str) -> String {
    STANDARD.encode(compress_str(text))
}

/// Decompress text framed as standard base64.
///
/// An empty string is rejected with [`LzError::EmptyInput`]; it is not a valid encoding of any
/// text, not even the empty one.
pub fn decompress_from_base64(text: &str) -> Result<String> {
    if text.is_empty() {
        return Err(LzError::EmptyInput);
    }
    let data = STANDARD.decode(text)?;
    decompress_to_string(&data)
}
