//! Document encoding: raw PDF bytes → base64 for the JSON request body.
//!
//! Both supported services accept documents inline as standard base64 with
//! padding, tagged with the `application/pdf` media type.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// Media type sent with every document.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// A document ready to embed in a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDocument {
    pub file_name: String,
    pub media_type: &'static str,
    /// Standard base64 of the raw file bytes.
    pub data: String,
}

/// Encode raw PDF bytes for transmission.
pub fn encode_document(file_name: &str, bytes: &[u8]) -> EncodedDocument {
    let data = STANDARD.encode(bytes);
    debug!(
        "Encoded {} → {} bytes raw, {} bytes base64",
        file_name,
        bytes.len(),
        data.len()
    );

    EncodedDocument {
        file_name: file_name.to_string(),
        media_type: PDF_MEDIA_TYPE,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_binary_safe() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        let doc = encode_document("bin.pdf", &bytes);
        assert_eq!(doc.media_type, "application/pdf");
        assert_eq!(STANDARD.decode(&doc.data).expect("valid base64"), bytes);
    }

    #[test]
    fn encode_known_value() {
        let doc = encode_document("m.pdf", b"%PDF");
        assert_eq!(doc.data, "JVBERg==");
    }
}
