// src/ingest/encoding.rs

use encoding_rs::WINDOWS_1252;
use tracing::debug;

/// Decode raw spreadsheet bytes: UTF-8 (BOM stripped) when valid, otherwise
/// Windows-1252, which is what Excel writes for Portuguese CSV exports.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            debug!("input is not UTF-8; decoding as windows-1252");
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            text.into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_with_bom() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFTipo;TOTAL"), "Tipo;TOTAL");
    }

    #[test]
    fn latin_fallback() {
        // "RESÍDUO" with Í = 0xCD in windows-1252
        assert_eq!(decode_text(b"RES\xCDDUO"), "RESÍDUO");
    }
}
