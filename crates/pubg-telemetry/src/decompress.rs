//! Gzip detection and in-memory decompression.

use crate::error::TelemetryError;
use flate2::read::GzDecoder;
use std::io::Read;

/// First two bytes of every gzip stream.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

pub fn is_gzip(data: &[u8]) -> bool {
    data.starts_with(&GZIP_MAGIC)
}

/// Gunzip `data`.
pub fn gunzip(data: &[u8]) -> Result<Vec<u8>, TelemetryError> {
    let mut decoder = GzDecoder::new(data);
    let mut decompressed = Vec::new();

    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| TelemetryError::Decompression(e.to_string()))?;

    Ok(decompressed)
}

/// Gunzip `data` if it carries the gzip magic, otherwise return it as is.
///
/// The telemetry CDN sometimes serves the log with `Content-Encoding: gzip`,
/// in which case the HTTP layer has already inflated it.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, TelemetryError> {
    if is_gzip(data) {
        gunzip(data)
    } else {
        Ok(data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_decompress_gzip() {
        let compressed = gzip(b"[{\"_T\":\"LogMatchStart\"}]");
        assert!(is_gzip(&compressed));
        assert_eq!(
            decompress(&compressed).unwrap(),
            b"[{\"_T\":\"LogMatchStart\"}]"
        );
    }

    #[test]
    fn test_plain_passthrough() {
        let plain = b"[]";
        assert!(!is_gzip(plain));
        assert_eq!(decompress(plain).unwrap(), b"[]");
    }

    #[test]
    fn test_truncated_gzip() {
        let mut compressed = gzip(b"some telemetry that will be cut short");
        compressed.truncate(12);
        assert!(matches!(
            decompress(&compressed),
            Err(TelemetryError::Decompression(_))
        ));
    }
}
