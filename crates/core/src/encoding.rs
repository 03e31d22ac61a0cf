// ABOUTME: Turns raw input bytes into text before parsing.
// ABOUTME: Explicit label, then BOM, then UTF-8, then chardetng detection; bad sequences become U+FFFD.

use encoding_rs::Encoding;
use tracing::debug;

use crate::error::{CleanError, Result};

/// Decode `bytes`, honouring an explicit `label` (e.g. `"iso-8859-1"`) when given.
pub fn decode_input(bytes: &[u8], label: Option<&str>) -> Result<String> {
    if let Some(label) = label {
        let encoding = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
            CleanError::input(
                "decode input",
                Some(anyhow::anyhow!("unknown encoding label {:?}", label)),
            )
        })?;
        let (decoded, _, had_errors) = encoding.decode(bytes);
        debug!(encoding = encoding.name(), had_errors, "decoded with explicit label");
        return Ok(decoded.into_owned());
    }

    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        let (decoded, _, _) = encoding.decode(bytes);
        debug!(encoding = encoding.name(), "decoded by BOM");
        return Ok(decoded.into_owned());
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.to_string());
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, had_errors) = encoding.decode(bytes);
    debug!(encoding = encoding.name(), had_errors, "decoded by detection");
    Ok(decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_passes_through() {
        assert_eq!(decode_input("café <p>".as_bytes(), None).unwrap(), "café <p>");
    }

    #[test]
    fn bom_is_stripped() {
        let bytes = [0xEF, 0xBB, 0xBF, b'<', b'p', b'>'];
        assert_eq!(decode_input(&bytes, None).unwrap(), "<p>");
    }

    #[test]
    fn explicit_label_wins() {
        let bytes: &[u8] = &[0x63, 0x61, 0x66, 0xe9];
        assert_eq!(decode_input(bytes, Some("iso-8859-1")).unwrap(), "café");
    }

    #[test]
    fn unknown_label_is_an_input_error() {
        let err = decode_input(b"x", Some("no-such-charset")).unwrap_err();
        assert!(err.is_input());
    }

    #[test]
    fn invalid_utf8_is_detected_without_replacement_chars() {
        let text = "Le caf\u{e9} est d\u{e9}j\u{e0} pr\u{ea}t pour la r\u{e9}union de l'\u{e9}quipe.";
        let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(text);
        let decoded = decode_input(&bytes, None).unwrap();
        assert!(!decoded.contains('\u{fffd}'), "got {}", decoded);
        assert!(decoded.starts_with("Le caf"));
    }
}
