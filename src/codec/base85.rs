//! Decoders for the four legacy base-85 text encodings.
//!
//! Input is consumed in groups of 5 characters; each group is one
//! little-endian 32-bit word computed as
//! `b4*85^4 + b3*85^3 + b2*85^2 + b1*85 + b0`, where `b0` is the first
//! character's digit value. The accumulated word is truncated to 32 bits,
//! exactly as the original typed-array encoders behaved.
//!
//! Two digit alphabets cover all four historical variants:
//!
//! - **script-safe**: digit `d` is carried by code `d + 0x29` (0x29..0x7D),
//!   except digit 51, whose natural carrier `\` cannot appear inside a
//!   script string literal and is carried by `~` instead.
//! - **markup-safe**: digit `d` is carried by code `d + 0x2A` (0x2A..0x7E),
//!   except digits 18 and 20, whose natural carriers `<` and `>` cannot
//!   appear inside markup and are carried by `(` and `)`.
//!
//! Header-bearing streams start with a comma-terminated decoded byte
//! length. A plain decimal header selects the script-safe alphabet, unless
//! the payload contains a backslash — a character the script-safe encoder
//! never emits — in which case the stream is markup-safe. A header that is
//! not plain decimal is the obfuscated kind: every header character is
//! shifted down by 49 (ASCII `1`) before being read as a decimal digit,
//! and the payload is always markup-safe. The backslash rule is inherited
//! from the artifacts in the wild and is deliberately probabilistic: a
//! markup-safe payload that happens to contain no backslash decodes with
//! the wrong alphabet, and that ambiguity must be preserved.

use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::{Result, UnpackageError};

/// Digit alphabets used by the historical encoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alphabet {
    /// Base 0x29; `~` stands in for `\`.
    ScriptSafe,
    /// Base 0x2A; `(` and `)` stand in for `<` and `>`.
    MarkupSafe,
}

impl Alphabet {
    /// Digit value carried by `code`.
    ///
    /// Codes outside the alphabet wrap instead of failing: the historical
    /// decoders produced garbage for garbage rather than rejecting it.
    fn digit(self, code: u8) -> u8 {
        match self {
            Alphabet::ScriptSafe => {
                let code = if code == b'~' { b'\\' } else { code };
                code.wrapping_sub(0x29)
            }
            Alphabet::MarkupSafe => {
                let code = match code {
                    b'(' => b'<',
                    b')' => b'>',
                    other => other,
                };
                code.wrapping_sub(0x2A)
            }
        }
    }
}

/// Decode `payload` into exactly `byte_len` bytes.
///
/// A trailing group shorter than 5 characters is padded with zero digits.
/// The word buffer grows in whole 4-byte steps and is then resized to the
/// declared length, so pad bytes are never exposed (and a declared length
/// beyond the payload is zero-filled, as the original buffer allocation
/// did).
fn decode(payload: &str, byte_len: usize, alphabet: Alphabet) -> Result<Vec<u8>> {
    let bytes = payload.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() / 5 * 4 + 4);
    for group in bytes.chunks(5) {
        let mut word: u64 = 0;
        let mut scale: u64 = 1;
        for &code in group {
            word += u64::from(alphabet.digit(code)) * scale;
            scale *= 85;
        }
        out.write_u32::<LittleEndian>(word as u32)?;
    }
    out.resize(byte_len, 0);
    Ok(out)
}

/// Decode a header-bearing stream of the form `<length>,<payload>`.
///
/// Applies the historical selection rule between the three header-bearing
/// variants (see the module docs).
///
/// # Errors
///
/// Fails with [`UnpackageError::InvalidLengthHeader`] if there is no comma
/// or the length does not parse.
pub fn decode_prefixed(text: &str) -> Result<Vec<u8>> {
    let (header, payload) = text
        .split_once(',')
        .ok_or(UnpackageError::InvalidLengthHeader)?;

    if header.bytes().all(|b| b.is_ascii_digit()) {
        let byte_len = parse_length(header)?;
        let alphabet = if payload.contains('\\') {
            Alphabet::MarkupSafe
        } else {
            Alphabet::ScriptSafe
        };
        decode(payload, byte_len, alphabet)
    } else {
        // Obfuscated header: digits stored shifted up by 49.
        let header: String = header.bytes().map(|b| b.wrapping_sub(49) as char).collect();
        let byte_len = parse_length(&header)?;
        decode(payload, byte_len, Alphabet::MarkupSafe)
    }
}

/// Decode a headerless stream whose byte length arrives out-of-band.
///
/// Used by the progressive-chunk HTML embedding, where each chunk's length
/// is declared in its own tag attribute and the caller sums them.
pub fn decode_raw(text: &str, byte_len: usize) -> Result<Vec<u8>> {
    decode(text, byte_len, Alphabet::MarkupSafe)
}

fn parse_length(header: &str) -> Result<usize> {
    header
        .parse()
        .map_err(|_| UnpackageError::InvalidLengthHeader)
}
