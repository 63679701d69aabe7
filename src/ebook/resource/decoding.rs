//! The decoding pipeline applied to encrypted resources:
//! raw bytes, then decryption, then decompression.

use crate::ebook::epub::encryption::CompressionMethod;
use crate::ebook::resource::errors::{DecodingStage, ResourceError, ResourceResult};
use crate::ebook::resource::{DecryptionContext, Decryptor};
use flate2::read::DeflateDecoder;
use std::io::{self, Read};

/// Decodes the raw bytes of an encrypted resource.
///
/// A missing `decryptor` fails at the [`DecodingStage::Decryption`] stage.
pub(super) fn decode(
    context: &DecryptionContext<'_>,
    decryptor: Option<&dyn Decryptor>,
    raw: Vec<u8>,
) -> ResourceResult<Vec<u8>> {
    let href = context.href();
    let decryptor = decryptor.ok_or_else(|| {
        ResourceError::decoding(
            href,
            DecodingStage::Decryption,
            format!("No decryptor registered for `{}`", context.encryption().algorithm()),
        )
    })?;
    let decrypted = decryptor
        .decrypt(context, raw)
        .map_err(|error| ResourceError::decoding(href, DecodingStage::Decryption, error))?;

    match compression_method(context)? {
        CompressionMethod::Stored => Ok(decrypted),
        CompressionMethod::Deflated => inflate(&decrypted)
            .map_err(|error| ResourceError::decoding(href, DecodingStage::Decompression, error)),
    }
}

/// The declared compression, with no declaration meaning [`CompressionMethod::Stored`].
pub(super) fn compression_method(context: &DecryptionContext<'_>) -> ResourceResult<CompressionMethod> {
    context
        .encryption()
        .compression()
        .map_or(Ok(CompressionMethod::Stored), |compression| {
            compression.compression_method().map_err(|error| {
                ResourceError::decoding(context.href(), DecodingStage::Decompression, error)
            })
        })
}

/// Inflates raw deflate data (no zlib header).
fn inflate(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut inflated = Vec::with_capacity(data.len() * 2);
    DeflateDecoder::new(data).read_to_end(&mut inflated)?;
    Ok(inflated)
}
