//! Content-Encoding decompression for response bodies.

use anyhow::Result;
use bytes::Bytes;
use flate2::read::{DeflateDecoder, GzDecoder};
use std::io::Read;

pub const ENC_GZIP: &str = "gzip";
pub const ENC_DEFLATE: &str = "deflate";
pub const ENC_ZSTD: &str = "zstd";

pub fn decode_gzip(data: &[u8]) -> Result<Bytes> {
    let mut decoder = GzDecoder::new(data);
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded)?;
    Ok(Bytes::from(decoded))
}

pub fn decode_deflate(data: &[u8]) -> Result<Bytes> {
    let mut decoder = DeflateDecoder::new(data);
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded)?;
    Ok(Bytes::from(decoded))
}

pub fn decode_zstd(data: &[u8]) -> Result<Bytes> {
    Ok(Bytes::from(zstd::decode_all(data)?))
}

/// Undo every coding listed in a `Content-Encoding` value, last applied first
///
/// Unknown codings (and `identity`) pass the data through unchanged.
pub fn decode_body(body: Bytes, content_encoding: &str) -> Result<Bytes> {
    let codings: Vec<String> = content_encoding
        .split(',')
        .map(|coding| coding.trim().to_ascii_lowercase())
        .filter(|coding| !coding.is_empty())
        .collect();

    codings.iter().rev().try_fold(body, |data, coding| match coding.as_str() {
        ENC_GZIP | "x-gzip" => decode_gzip(&data),
        ENC_DEFLATE => decode_deflate(&data),
        ENC_ZSTD => decode_zstd(&data),
        other => {
            tracing::debug!("decoder: passing through unknown coding {other}");
            Ok(data)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::{DeflateEncoder, GzEncoder};
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn decode_gzip_should_return_correct_bytes() {
        let data = vec![
            31, 139, 8, 0, 0, 0, 0, 0, 0, 255, 43, 73, 45, 46, 137, 55, 52, 50, 6, 0, 21, 191, 53,
            241, 8, 0, 0, 0,
        ];
        assert_eq!(decode_gzip(&data).unwrap().as_ref(), b"test_123");
    }

    #[test]
    fn decode_zstd_should_return_correct_bytes() {
        let data = vec![
            40, 181, 47, 253, 0, 88, 65, 0, 0, 116, 101, 115, 116, 95, 49, 50, 51,
        ];
        assert_eq!(decode_zstd(&data).unwrap().as_ref(), b"test_123");
    }

    #[test]
    fn decode_body_should_dispatch_case_insensitively() {
        let compressed = Bytes::from(gzip(b"hello"));
        assert_eq!(decode_body(compressed, " GZIP ").unwrap().as_ref(), b"hello");
    }

    #[test]
    fn decode_body_should_undo_stacked_codings_in_reverse() {
        let mut deflate = DeflateEncoder::new(Vec::new(), flate2::Compression::default());
        deflate.write_all(&gzip(b"layered")).unwrap();
        let twice = Bytes::from(deflate.finish().unwrap());
        assert_eq!(decode_body(twice, "gzip, deflate").unwrap().as_ref(), b"layered");
    }

    #[test]
    fn identity_and_unknown_codings_should_pass_through() {
        let raw = Bytes::from_static(b"plain");
        assert_eq!(decode_body(raw.clone(), "").unwrap(), raw);
        assert_eq!(decode_body(raw.clone(), "identity").unwrap(), raw);
        assert_eq!(decode_body(raw.clone(), "br").unwrap(), raw);
    }

    #[test]
    fn corrupted_gzip_should_error() {
        let corrupted = Bytes::from_static(&[31, 139, 8, 0, 0, 0, 0, 0, 0, 255, 1, 2, 3]);
        assert!(decode_body(corrupted, "gzip").is_err());
    }
}
