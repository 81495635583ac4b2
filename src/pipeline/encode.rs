//! Payload encoding: normalized page file → base64 body for the provider.
//!
//! Vision APIs accept images as base64 strings inside the JSON request body.
//! The media type is derived from the file extension; normalized pages keep
//! their source format, so a mixed archive (jpg + png) round-trips correctly.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fs;
use std::io;
use std::path::Path;
use tracing::trace;

/// A page image encoded for upload.
#[derive(Debug, Clone)]
pub struct EncodedPage {
    /// Base64 of the raw file bytes.
    pub data: String,
    /// IANA media type, e.g. `image/jpeg`.
    pub media_type: &'static str,
}

/// Read and base64-encode a normalized page.
pub fn encode_page(path: &Path) -> io::Result<EncodedPage> {
    let bytes = fs::read(path)?;
    let data = STANDARD.encode(&bytes);
    trace!("Encoded {} → {} bytes base64", path.display(), data.len());

    Ok(EncodedPage {
        data,
        media_type: media_type_for(path),
    })
}

/// Media type for an image path, by extension. Defaults to `image/jpeg`.
pub fn media_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn media_type_by_extension() {
        assert_eq!(media_type_for(&PathBuf::from("photo1.jpg")), "image/jpeg");
        assert_eq!(media_type_for(&PathBuf::from("photo2.PNG")), "image/png");
        assert_eq!(media_type_for(&PathBuf::from("photo3.gif")), "image/gif");
        assert_eq!(media_type_for(&PathBuf::from("photo4.bmp")), "image/bmp");
        assert_eq!(media_type_for(&PathBuf::from("photo5")), "image/jpeg");
    }

    #[test]
    fn encode_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo1.jpg");
        fs::write(&path, b"jpeg bytes").unwrap();

        let encoded = encode_page(&path).unwrap();
        assert_eq!(encoded.media_type, "image/jpeg");
        assert_eq!(STANDARD.decode(&encoded.data).unwrap(), b"jpeg bytes");
    }
}
