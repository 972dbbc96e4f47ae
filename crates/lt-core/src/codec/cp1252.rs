//! Windows-1252, the code page every supported timing system writes.

use tracing::warn;

use crate::error::FormatError;

/// Characters for bytes 0x80..=0x9F; `None` marks the five unassigned bytes.
const HIGH_CONTROL: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

pub fn decode(bytes: &[u8]) -> Result<String, FormatError> {
    bytes
        .iter()
        .enumerate()
        .map(|(offset, &byte)| match byte {
            0x80..=0x9F => HIGH_CONTROL[usize::from(byte - 0x80)]
                .ok_or(FormatError::Encoding { byte, offset }),
            _ => Ok(char::from(byte)),
        })
        .collect()
}

/// Encodes text, replacing characters outside the code page with `?`.
pub fn encode(text: &str) -> Vec<u8> {
    let mut replaced = 0_usize;
    let bytes = text
        .chars()
        .map(|c| {
            encode_char(c).unwrap_or_else(|| {
                replaced += 1;
                b'?'
            })
        })
        .collect();
    if replaced > 0 {
        warn!(replaced, "characters not representable in Windows-1252");
    }
    bytes
}

fn encode_char(c: char) -> Option<u8> {
    let code = u32::from(c);
    match code {
        0x00..=0x7F | 0xA0..=0xFF => u8::try_from(code).ok(),
        _ => HIGH_CONTROL
            .iter()
            .position(|&mapped| mapped == Some(c))
            .and_then(|index| u8::try_from(index + 0x80).ok()),
    }
}
