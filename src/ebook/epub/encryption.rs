//! Per-resource encryption declared by `META-INF/encryption.xml`.

use crate::ebook::epub::errors::EpubResult;
use crate::ebook::named::NamedEnum;
use crate::util::uri;
use std::collections::HashMap;

/// Well-known algorithm and scheme identifiers.
pub mod algorithms {
    /// IDPF font obfuscation.
    pub const IDPF_OBFUSCATION: &str = "http://www.idpf.org/2008/embedding";
    /// Adobe font obfuscation.
    pub const ADOBE_OBFUSCATION: &str = "http://ns.adobe.com/pdf/enc#RC";
    /// AES-256 in CBC mode.
    pub const AES256_CBC: &str = "http://www.w3.org/2001/04/xmlenc#aes256-cbc";
    /// The retrieval scheme of LCP-protected publications.
    pub const LCP_SCHEME: &str = "http://readium.org/2014/01/lcp";
}

/// How an encrypted resource was compressed before encryption.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum CompressionMethod {
    /// `0`: no compression.
    Stored,
    /// `8`: raw deflate.
    Deflated,
}

impl NamedEnum for CompressionMethod {
    const KIND: &'static str = "compression method";
    const DEFAULT: Self = Self::Stored;
    const ENTRIES: &'static [(&'static str, Self)] = &[("0", Self::Stored), ("8", Self::Deflated)];
}

/// The `<Compression>` encryption property of a resource.
#[derive(Clone, Debug, PartialEq)]
pub struct Compression {
    method: String,
    original_length: Option<u64>,
}

impl Compression {
    pub fn new(method: impl Into<String>, original_length: Option<u64>) -> Self {
        Self {
            method: method.into(),
            original_length,
        }
    }

    /// The method as declared, such as `8`.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The declared method resolved strictly.
    ///
    /// # Errors
    /// [`EpubError::UnknownEnumValue`](crate::ebook::errors::EpubError::UnknownEnumValue)
    /// for a method other than `0` or `8`.
    pub fn compression_method(&self) -> EpubResult<CompressionMethod> {
        CompressionMethod::from_name(self.method.trim())
    }

    /// The length of the resource before compression.
    pub fn original_length(&self) -> Option<u64> {
        self.original_length
    }
}

/// How a single resource is encrypted.
#[derive(Clone, Debug, PartialEq)]
pub struct Encryption {
    algorithm: String,
    compression: Option<Compression>,
    scheme: Option<String>,
    retrieval: Option<String>,
}

impl Encryption {
    /// `algorithm` is the URI of the encryption method,
    /// such as [`algorithms::AES256_CBC`].
    pub fn new(algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            compression: None,
            scheme: None,
            retrieval: None,
        }
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = Some(compression);
        self
    }

    /// Sets the protection scheme, such as [`algorithms::LCP_SCHEME`].
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Sets the `KeyInfo` retrieval method URI.
    pub fn with_retrieval(mut self, retrieval: impl Into<String>) -> Self {
        self.retrieval = Some(retrieval.into());
        self
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn compression(&self) -> Option<&Compression> {
        self.compression.as_ref()
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn retrieval(&self) -> Option<&str> {
        self.retrieval.as_deref()
    }

    /// Returns `true` for the non-cryptographic IDPF and Adobe font obfuscations.
    pub fn is_obfuscation(&self) -> bool {
        matches!(
            self.algorithm.as_str(),
            algorithms::IDPF_OBFUSCATION | algorithms::ADOBE_OBFUSCATION
        )
    }
}

/// Encryption descriptions keyed by canonical container path.
///
/// A path absent from the map denotes an unencrypted resource.
///
/// # Examples
/// - Looking up a resource:
/// ```
/// # use bindery::epub::encryption::{Encryption, EncryptionData, algorithms};
/// let data = EncryptionData::from_entries([
///     ("/OEBPS/fonts/serif%201.otf", Encryption::new(algorithms::IDPF_OBFUSCATION)),
/// ]);
///
/// assert!(data.contains("OEBPS/fonts/serif 1.otf"));
/// assert!(data.get("/OEBPS/fonts/serif%201.otf").is_some());
/// assert!(data.get("OEBPS/c1.xhtml").is_none());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EncryptionData(HashMap<String, Encryption>);

impl EncryptionData {
    /// Builds the map; keys are canonicalized.
    ///
    /// When a path is declared more than once, the last declaration wins.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (impl AsRef<str>, Encryption)>,
    ) -> Self {
        let mut map = HashMap::new();

        for (path, encryption) in entries {
            let key = uri::canonicalize(path.as_ref());

            if let Some(previous) = map.insert(key, encryption) {
                tracing::debug!(
                    path = path.as_ref(),
                    previous = previous.algorithm(),
                    "replaced duplicate encryption entry"
                );
            }
        }
        Self(map)
    }

    /// Returns the encryption of the resource at `href`, canonicalized first.
    pub fn get(&self, href: &str) -> Option<&Encryption> {
        self.by_canonical_href(&uri::canonicalize(href))
    }

    /// Returns the encryption of the resource at the canonical container path `href`,
    /// taken verbatim.
    pub(crate) fn by_canonical_href(&self, href: &str) -> Option<&Encryption> {
        self.0.get(href)
    }

    pub fn contains(&self, href: &str) -> bool {
        self.get(href).is_some()
    }

    /// Every `(path, encryption)` pair, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Encryption)> {
        self.0.iter().map(|(path, encryption)| (path.as_str(), encryption))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
