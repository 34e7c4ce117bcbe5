//! File system helpers: encoding-aware document reading.
use std::path::Path;

/// Reads a document as text.
///
/// UTF-16 files are recognised by their BOM, invalid UTF-8 falls back to
/// Windows-1251, and a leading UTF-8 BOM is removed.
pub fn read_document<P: AsRef<Path>>(path: P) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(decode_document(bytes))
}

pub fn decode_document(bytes: Vec<u8>) -> String {
    let content = match bytes.as_slice() {
        [0xFF, 0xFE, ..] => {
            let (decoded, _, had_errors) = encoding_rs::UTF_16LE.decode(&bytes);
            if had_errors {
                tracing::warn!("Errors detected while decoding UTF-16LE document");
            }
            decoded.into_owned()
        }
        [0xFE, 0xFF, ..] => {
            let (decoded, _, had_errors) = encoding_rs::UTF_16BE.decode(&bytes);
            if had_errors {
                tracing::warn!("Errors detected while decoding UTF-16BE document");
            }
            decoded.into_owned()
        }
        _ => match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(err) => {
                tracing::debug!("UTF-8 decoding failed, trying Windows-1251");
                let bytes = err.into_bytes();
                let (decoded, _, had_errors) = encoding_rs::WINDOWS_1251.decode(&bytes);
                if had_errors {
                    tracing::warn!("Errors detected while decoding Windows-1251 document");
                }
                decoded.into_owned()
            }
        },
    };

    match content.strip_prefix('\u{FEFF}') {
        Some(rest) => rest.to_string(),
        None => content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_utf8_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"<div></div>");
        assert_eq!(decode_document(bytes), "<div></div>");
    }

    #[test]
    fn test_decodes_utf16le() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "<p>".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_document(bytes), "<p>");
    }

    #[test]
    fn test_plain_utf8_untouched() {
        assert_eq!(decode_document(b"<b>x</b>".to_vec()), "<b>x</b>");
    }
}
