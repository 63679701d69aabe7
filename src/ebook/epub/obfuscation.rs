//! Built-in font deobfuscation.
//!
//! Font obfuscation is not encryption: the leading bytes of a font are XORed
//! with a key derived from the publication identifier, so that fonts lifted
//! out of a package are unusable on their own.
//!
//! | Algorithm | Key | Obfuscated bytes |
//! |-----------|-----|------------------|
//! | [`IDPF`](crate::epub::encryption::algorithms::IDPF_OBFUSCATION) | SHA-1 of the unique identifier, whitespace removed | 1040 |
//! | [`Adobe`](crate::epub::encryption::algorithms::ADOBE_OBFUSCATION) | The 16 bytes of the `urn:uuid:` identifier | 1024 |
//!
//! Both are registered by default, see
//! [`FetcherOptions::deobfuscate_fonts`](crate::ebook::resource::FetcherOptions::deobfuscate_fonts).

use crate::ebook::resource::{DecryptionContext, Decryptor, DecryptorError};

const IDPF_LENGTH: usize = 1040;
const ADOBE_LENGTH: usize = 1024;

/// Deobfuscates fonts obfuscated with the IDPF algorithm.
#[derive(Copy, Clone, Debug, Default)]
pub struct IdpfObfuscation;

impl IdpfObfuscation {
    /// The SHA-1 key derived from a unique identifier.
    pub fn key(identifier: &str) -> [u8; 20] {
        let identifier = identifier
            .chars()
            .filter(|c| !matches!(c, ' ' | '\t' | '\r' | '\n'))
            .collect::<String>();

        sha1_smol::Sha1::from(identifier).digest().bytes()
    }
}

impl Decryptor for IdpfObfuscation {
    fn decrypt(&self, context: &DecryptionContext<'_>, mut data: Vec<u8>) -> Result<Vec<u8>, DecryptorError> {
        let key = Self::key(identifier(context)?);
        xor_prefix(&mut data, &key, IDPF_LENGTH);
        Ok(data)
    }

    fn decrypted_length(&self, _: &DecryptionContext<'_>, encrypted_length: u64) -> Option<u64> {
        Some(encrypted_length)
    }
}

/// Deobfuscates fonts obfuscated with the Adobe algorithm.
#[derive(Copy, Clone, Debug, Default)]
pub struct AdobeObfuscation;

impl AdobeObfuscation {
    /// The key derived from a `urn:uuid:` identifier.
    ///
    /// # Errors
    /// When the identifier is not a UUID.
    pub fn key(identifier: &str) -> Result<[u8; 16], DecryptorError> {
        let uuid = identifier
            .trim()
            .trim_start_matches("urn:uuid:")
            .replace('-', "");
        let bytes = hex::decode(&uuid)?;

        <[u8; 16]>::try_from(bytes.as_slice())
            .map_err(|_| format!("Invalid UUID length: expected 16 bytes, got {}", bytes.len()).into())
    }
}

impl Decryptor for AdobeObfuscation {
    fn decrypt(&self, context: &DecryptionContext<'_>, mut data: Vec<u8>) -> Result<Vec<u8>, DecryptorError> {
        let key = Self::key(identifier(context)?)?;
        xor_prefix(&mut data, &key, ADOBE_LENGTH);
        Ok(data)
    }

    fn decrypted_length(&self, _: &DecryptionContext<'_>, encrypted_length: u64) -> Option<u64> {
        Some(encrypted_length)
    }
}

fn identifier<'a>(context: &DecryptionContext<'a>) -> Result<&'a str, DecryptorError> {
    context
        .epub()
        .package()
        .metadata()
        .identifier()
        .ok_or_else(|| "The publication has no identifier to derive a key from".into())
}

/// XORs up to `length` leading bytes of `data` with the repeating `key`.
fn xor_prefix(data: &mut [u8], key: &[u8], length: usize) {
    let length = length.min(data.len());

    for (byte, key) in data[..length].iter_mut().zip(key.iter().cycle()) {
        *byte ^= key;
    }
}
