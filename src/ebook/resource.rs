//! Asynchronous, range-addressable access to publication resources.
//!
//! A [`Fetcher`] pairs an opened [`Epub`] with the [`Archive`] it was read from.
//! [`Fetcher::get`] resolves a [`Link`] against the manifest and encryption map
//! into a [`Resource`] handle without performing any I/O.
//! Failures are reported lazily, by the first [`Resource::length`] or
//! [`Resource::read`] call.
//!
//! # Decoding
//! Resources listed in the encryption map are decoded before being returned:
//! 1. Decryption, by the [`Decryptor`] registered for the declared algorithm.
//! 2. Decompression, when a compression method other than `0` is declared.
//!
//! Resources absent from the encryption map are returned as stored.

mod decoding;
pub mod errors;

use crate::ebook::archive::errors::ArchiveError;
use crate::ebook::archive::{self, Archive, ArchiveAccess};
use crate::ebook::epub::Epub;
use crate::ebook::epub::encryption::{CompressionMethod, Encryption, algorithms};
use crate::ebook::epub::manifest::Item;
use crate::ebook::epub::obfuscation::{AdobeObfuscation, IdpfObfuscation};
use crate::ebook::link::Link;
use crate::ebook::resource::errors::{ResourceError, ResourceResult};
use crate::util::uri;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::ops::Range;
use std::sync::Arc;
use tokio::sync::Mutex;

pub use self::errors::DecodingStage;

/// Alias for the error returned by a [`Decryptor`].
pub type DecryptorError = Box<dyn Error + Send + Sync + 'static>;

/// Details of the resource being decrypted.
#[derive(Copy, Clone, Debug)]
pub struct DecryptionContext<'a> {
    href: &'a str,
    encryption: &'a Encryption,
    epub: &'a Epub,
}

impl<'a> DecryptionContext<'a> {
    /// The canonical container path of the resource.
    pub fn href(&self) -> &'a str {
        self.href
    }

    /// The encryption declared for the resource.
    pub fn encryption(&self) -> &'a Encryption {
        self.encryption
    }

    /// The publication the resource belongs to,
    /// such as to derive a key from its identifier.
    pub fn epub(&self) -> &'a Epub {
        self.epub
    }
}

/// A decryption transform keyed by an algorithm URI,
/// such as [`algorithms::AES256_CBC`].
///
/// Key management is the responsibility of implementations.
///
/// # Examples
/// - Registering a decryptor:
/// ```
/// # use bindery::ebook::resource::{DecryptionContext, Decryptor, DecryptorError, FetcherOptions};
/// struct Reverse;
///
/// impl Decryptor for Reverse {
///     fn decrypt(&self, _: &DecryptionContext<'_>, mut data: Vec<u8>) -> Result<Vec<u8>, DecryptorError> {
///         data.reverse();
///         Ok(data)
///     }
/// }
///
/// let options = FetcherOptions::builder().decryptor("urn:example:reverse", Reverse);
/// ```
pub trait Decryptor: Send + Sync {
    /// Decrypts the entire content of a resource.
    fn decrypt(
        &self,
        context: &DecryptionContext<'_>,
        data: Vec<u8>,
    ) -> Result<Vec<u8>, DecryptorError>;

    /// The plaintext length for the given encrypted length, when computable
    /// without decrypting, such as for length-preserving transforms.
    ///
    /// Returns [`None`] by default.
    fn decrypted_length(&self, context: &DecryptionContext<'_>, encrypted_length: u64) -> Option<u64> {
        let _ = (context, encrypted_length);
        None
    }
}

/// Settings of a [`Fetcher`].
///
/// To create a mutable options instance, see
/// [`FetcherOptions::builder`] or [`FetcherOptions::default`].
#[non_exhaustive]
#[derive(Clone)]
pub struct FetcherOptions {
    /// Register the built-in IDPF and Adobe font deobfuscation decryptors.
    ///
    /// Explicitly registered decryptors for those algorithms take precedence.
    ///
    /// Default: `true`
    pub deobfuscate_fonts: bool,
    /// Infer the media type of resources without a declared one from their extension.
    ///
    /// Default: `true`
    pub infer_media_types: bool,
    decryptors: HashMap<String, Arc<dyn Decryptor>>,
}

impl FetcherOptions {
    /// Returns a builder to create a [`FetcherOptions`] instance.
    pub fn builder() -> FetcherOptionsBuilder {
        FetcherOptionsBuilder(Self::default())
    }
}

impl Default for FetcherOptions {
    fn default() -> Self {
        Self {
            deobfuscate_fonts: true,
            infer_media_types: true,
            decryptors: HashMap::new(),
        }
    }
}

impl Debug for FetcherOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetcherOptions")
            .field("deobfuscate_fonts", &self.deobfuscate_fonts)
            .field("infer_media_types", &self.infer_media_types)
            .field("decryptors", &self.decryptors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl From<FetcherOptionsBuilder> for FetcherOptions {
    fn from(value: FetcherOptionsBuilder) -> Self {
        value.build()
    }
}

/// Builder to construct a [`FetcherOptions`] instance.
#[derive(Clone, Debug)]
pub struct FetcherOptionsBuilder(FetcherOptions);

impl FetcherOptionsBuilder {
    /// Turn this builder into a [`FetcherOptions`] instance.
    pub fn build(self) -> FetcherOptions {
        self.0
    }

    /// See [`FetcherOptions::deobfuscate_fonts`].
    pub fn deobfuscate_fonts(mut self, deobfuscate_fonts: bool) -> Self {
        self.0.deobfuscate_fonts = deobfuscate_fonts;
        self
    }

    /// See [`FetcherOptions::infer_media_types`].
    pub fn infer_media_types(mut self, infer_media_types: bool) -> Self {
        self.0.infer_media_types = infer_media_types;
        self
    }

    /// Registers a [`Decryptor`] for the given algorithm URI,
    /// replacing any previous registration.
    pub fn decryptor(mut self, algorithm: impl Into<String>, decryptor: impl Decryptor + 'static) -> Self {
        self.0
            .decryptors
            .insert(algorithm.into(), Arc::new(decryptor));
        self
    }
}

struct FetcherContext {
    epub: Arc<Epub>,
    archive: Arc<dyn Archive>,
    decryptors: HashMap<String, Arc<dyn Decryptor>>,
    infer_media_types: bool,
    /// Present for [`ArchiveAccess::Serial`] archives.
    gate: Option<Mutex<()>>,
}

impl FetcherContext {
    /// Runs an archive call, one at a time for serial archives.
    async fn gated<T>(&self, call: impl Future<Output = T>) -> T {
        match &self.gate {
            Some(gate) => {
                let _guard = gate.lock().await;
                call.await
            }
            None => call.await,
        }
    }
}

/// Resolves [`Link`]s into [`Resource`] handles backed by an [`Archive`].
///
/// Cloning is cheap; clones share the publication, the archive and its gate.
///
/// # Concurrency
/// Calls into an [`ArchiveAccess::Serial`] archive are issued one at a time,
/// in the order they acquire the fetcher's gate.
/// Calls into an [`ArchiveAccess::Concurrent`] archive are not gated.
/// Nothing is cached; every read retrieves and decodes again.
///
/// # Examples
/// - Reading a chapter:
/// ```
/// # use bindery::ebook::archive::DirectoryArchive;
/// # use bindery::{Epub, Fetcher};
/// # use std::sync::Arc;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let archive = Arc::new(DirectoryArchive::new("tests/ebooks/example_epub")?);
/// let epub = Arc::new(Epub::open(archive.as_ref()).await?);
/// let fetcher = Fetcher::new(epub, archive);
///
/// let chapter = fetcher.get("/EPUB/c1.xhtml#start");
/// assert_eq!("EPUB/c1.xhtml", chapter.link().href());
/// assert_eq!(Some("application/xhtml+xml"), chapter.link().media_type());
///
/// let content = chapter.read(None).await?;
/// assert_eq!(chapter.length().await?, content.len() as u64);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Fetcher(Arc<FetcherContext>);

impl Fetcher {
    /// Creates a fetcher with default [`FetcherOptions`].
    pub fn new(epub: Arc<Epub>, archive: Arc<dyn Archive>) -> Self {
        Self::with_options(epub, archive, FetcherOptions::default())
    }

    /// Creates a fetcher with the specified [`FetcherOptions`].
    pub fn with_options(
        epub: Arc<Epub>,
        archive: Arc<dyn Archive>,
        options: impl Into<FetcherOptions>,
    ) -> Self {
        let options = options.into();
        let mut decryptors = options.decryptors;

        if options.deobfuscate_fonts {
            decryptors
                .entry(algorithms::IDPF_OBFUSCATION.to_owned())
                .or_insert_with(|| Arc::new(IdpfObfuscation));
            decryptors
                .entry(algorithms::ADOBE_OBFUSCATION.to_owned())
                .or_insert_with(|| Arc::new(AdobeObfuscation));
        }

        let access = archive.access();
        tracing::debug!(?access, decryptors = decryptors.len(), "creating fetcher");

        Self(Arc::new(FetcherContext {
            epub,
            archive,
            decryptors,
            infer_media_types: options.infer_media_types,
            gate: (access == ArchiveAccess::Serial).then(|| Mutex::new(())),
        }))
    }

    /// The publication resources are resolved against.
    pub fn epub(&self) -> &Epub {
        &self.0.epub
    }

    /// Resolves `link` into a [`Resource`] handle.
    ///
    /// The href is taken as written in markup and canonicalized
    /// (`?query` and `#fragment` removed, percent-decoded, `.`/`..` normalized,
    /// leading `/` removed) before being matched against the manifest and encryption map.
    /// An href without a manifest entry still yields a handle;
    /// errors surface on first use.
    ///
    /// This performs no I/O and never fails.
    ///
    /// # See Also
    /// - [`Self::get_item`] for manifest items, whose hrefs are already canonical.
    pub fn get(&self, link: impl Into<Link>) -> Resource {
        let link = link.into();
        let href = uri::canonicalize(link.href());

        self.resolve(link, href)
    }

    /// Resolves a manifest [`Item`] into a [`Resource`] handle.
    ///
    /// The item href is used verbatim,
    /// so container paths containing `#`, `?` or `%` resolve as declared.
    pub fn get_item(&self, item: &Item) -> Resource {
        self.resolve(Link::new(item.href()), item.href().to_owned())
    }

    /// Matches the canonical `href` against the manifest and encryption map.
    fn resolve(&self, link: Link, href: String) -> Resource {
        let epub = &self.0.epub;
        let media_type = epub
            .package()
            .manifest()
            .by_canonical_href(&href)
            .and_then(|item| item.media_type())
            .map(str::to_owned)
            .or_else(|| {
                self.0
                    .infer_media_types
                    .then(|| infer_media_type(&href))
                    .flatten()
                    .map(str::to_owned)
            });
        let encryption = epub
            .encryption()
            .and_then(|encryption| encryption.by_canonical_href(&href))
            .cloned();

        Resource {
            fetcher: Arc::clone(&self.0),
            link: link.into_resolved(href, media_type, encryption),
        }
    }
}

impl Debug for Fetcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("package", &self.0.epub.package().path())
            .field("access", &self.0.archive.access())
            .finish_non_exhaustive()
    }
}

/// A handle to the content of a single resource, created by [`Fetcher::get`].
///
/// Dropping a pending [`Self::length`] or [`Self::read`] future
/// releases the fetcher's gate and discards partial buffers.
#[derive(Clone)]
pub struct Resource {
    fetcher: Arc<FetcherContext>,
    link: Link,
}

impl Resource {
    /// The resolved [`Link`]: canonical href, declared or inferred media type,
    /// and [`Encryption`], if any.
    ///
    /// This performs no I/O and never fails.
    pub fn link(&self) -> &Link {
        &self.link
    }

    /// Returns `true` if the resource is listed in the encryption map.
    pub fn is_encrypted(&self) -> bool {
        self.link.encryption().is_some()
    }

    /// The length of the decoded content in bytes.
    ///
    /// For encrypted resources, the first available source is used:
    /// 1. The declared original (uncompressed) length.
    /// 2. The length reported by the [`Decryptor`] for length-preserving transforms.
    /// 3. The length of the fully decoded content.
    ///
    /// # Errors
    /// - [`ResourceError::ResourceNotFound`]: No entry exists for the href.
    /// - [`ResourceError::LengthUnavailable`]: The archive cannot report the length.
    /// - [`ResourceError::DecodingFailed`]: Decoding was required and failed.
    pub async fn length(&self) -> ResourceResult<u64> {
        // Surfaces a missing entry before any declared length
        let raw_length = self.raw_length().await?;

        let Some(encryption) = self.link.encryption() else {
            return raw_length.ok_or_else(|| ResourceError::LengthUnavailable(self.href().to_owned()));
        };
        if let Some(length) = encryption
            .compression()
            .and_then(|compression| compression.original_length())
        {
            return Ok(length);
        }

        let context = self.decryption_context(encryption);
        if decoding::compression_method(&context)? == CompressionMethod::Stored {
            let hint = self
                .decryptor(encryption)
                .zip(raw_length)
                .and_then(|(decryptor, length)| decryptor.decrypted_length(&context, length));

            if let Some(length) = hint {
                return Ok(length);
            }
        }
        self.decoded().await.map(|content| content.len() as u64)
    }

    /// Reads the decoded content, entirely or within `range`.
    ///
    /// The end of `range` is clamped to the content length.
    /// Unencrypted resources are read directly from the archive within `range`;
    /// encrypted resources are decoded entirely, then sliced.
    ///
    /// # Errors
    /// - [`ResourceError::ResourceNotFound`]: No entry exists for the href.
    /// - [`ResourceError::RangeNotSatisfiable`]: `range` starts after its end
    ///   or beyond the content length.
    /// - [`ResourceError::DecodingFailed`]: A decoding transform failed.
    pub async fn read(&self, range: Option<Range<u64>>) -> ResourceResult<Vec<u8>> {
        let Some(range) = range else {
            return match self.link.encryption() {
                Some(_) => self.decoded().await,
                None => self.raw_read().await,
            };
        };
        tracing::trace!(href = self.href(), ?range, "reading range");

        if range.start > range.end {
            return Err(self.unsatisfiable(range, None));
        }
        if self.link.encryption().is_some() {
            let content = self.decoded().await?;
            let length = content.len() as u64;

            if range.start > length {
                return Err(self.unsatisfiable(range, Some(length)));
            }
            return Ok(archive::slice_range(content, range));
        }

        // A length the archive cannot report leaves clamping to the archive
        let length = self.raw_length().await?;
        if let Some(length) = length.filter(|&length| range.start > length) {
            return Err(self.unsatisfiable(range, Some(length)));
        }
        let end = length.map_or(range.end, |length| range.end.min(length));
        let archive = &self.fetcher.archive;

        self.fetcher
            .gated(archive.read_range(self.href(), range.start..end))
            .await
            .map_err(|error| self.archive_error(error))
    }

    fn href(&self) -> &str {
        self.link.href()
    }

    fn decryption_context<'a>(&'a self, encryption: &'a Encryption) -> DecryptionContext<'a> {
        DecryptionContext {
            href: self.href(),
            encryption,
            epub: &self.fetcher.epub,
        }
    }

    fn decryptor(&self, encryption: &Encryption) -> Option<&dyn Decryptor> {
        self.fetcher
            .decryptors
            .get(encryption.algorithm())
            .map(Arc::as_ref)
    }

    async fn raw_length(&self) -> ResourceResult<Option<u64>> {
        self.fetcher
            .gated(self.fetcher.archive.length(self.href()))
            .await
            .map_err(|error| self.archive_error(error))
    }

    async fn raw_read(&self) -> ResourceResult<Vec<u8>> {
        self.fetcher
            .gated(self.fetcher.archive.read(self.href()))
            .await
            .map_err(|error| self.archive_error(error))
    }

    async fn decoded(&self) -> ResourceResult<Vec<u8>> {
        let raw = self.raw_read().await?;

        match self.link.encryption() {
            Some(encryption) => decoding::decode(
                &self.decryption_context(encryption),
                self.decryptor(encryption),
                raw,
            ),
            None => Ok(raw),
        }
    }

    fn unsatisfiable(&self, range: Range<u64>, length: Option<u64>) -> ResourceError {
        ResourceError::RangeNotSatisfiable {
            href: self.href().to_owned(),
            range,
            length,
        }
    }

    fn archive_error(&self, error: ArchiveError) -> ResourceError {
        match error {
            ArchiveError::NotFound { .. } => ResourceError::ResourceNotFound(self.href().to_owned()),
            error => ResourceError::Unavailable {
                href: self.href().to_owned(),
                source: Box::new(error),
            },
        }
    }
}

impl Debug for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("link", &self.link)
            .finish_non_exhaustive()
    }
}

fn infer_media_type(href: &str) -> Option<&'static str> {
    let media_type = match uri::extension(href)?.as_str() {
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "gif" => "image/gif",
        "webp" => "image/webp",

        // Text
        "xhtml" => "application/xhtml+xml",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "text/javascript",
        "smil" => "application/smil+xml",
        "ncx" => "application/x-dtbncx+xml",
        "opf" => "application/oebps-package+xml",
        "xml" => "application/xml",

        // Fonts
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "woff" => "font/woff",
        "woff2" => "font/woff2",

        // Audio
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",

        // Video
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",

        _ => return None,
    };
    Some(media_type)
}
