//! The Electronic Publication ([`Epub`]) module.
//!
//! Supports EPUB versions `2` and `3`.
//!
//! For more information regarding the EPUB spec, see:
//! <https://www.w3.org/TR/epub>

pub mod consts;
pub mod encryption;
pub mod errors;
pub mod manifest;
pub mod metadata;
pub mod navigation;
pub mod obfuscation;
pub mod package;
mod parser;
pub mod spine;

use crate::ebook::archive::Archive;
use crate::ebook::epub::encryption::{Encryption, EncryptionData};
use crate::ebook::epub::navigation::NavigationData;
use crate::ebook::epub::package::PackageDocument;
use crate::ebook::epub::parser::EpubParser;
use crate::ebook::errors::EbookResult;

/// An opened Electronic Publication (EPUB).
///
/// Holds the parsed package document along with the optional
/// navigation data and encryption map.
/// An [`Epub`] owns no archive handle;
/// resource content is retrieved through a [`Fetcher`](crate::Fetcher).
///
/// # Renditions
/// Multi-rendition EPUBs are not fully supported,
/// and the first OPF `rootfile` will always be selected.
///
/// # Examples
/// - Opening an unzipped EPUB directory:
/// ```
/// # use bindery::Epub;
/// # use bindery::ebook::archive::DirectoryArchive;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let archive = DirectoryArchive::new("tests/ebooks/example_epub")?;
/// let epub = Epub::open(&archive).await?;
/// let package = epub.package();
///
/// assert_eq!("EPUB/example.opf", package.path());
/// assert_eq!(Some("Example EPUB"), package.metadata().title());
/// assert_eq!(3.0, epub.version());
///
/// // Navigation is resolved to container paths
/// let toc = epub.navigation().unwrap().toc();
/// assert_eq!("EPUB/c1.xhtml", toc[0].href());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Epub {
    package: PackageDocument,
    navigation: Option<NavigationData>,
    encryption: Option<EncryptionData>,
}

impl Epub {
    /// Assembles an [`Epub`] from already parsed parts.
    pub fn new(
        package: PackageDocument,
        navigation: Option<NavigationData>,
        encryption: Option<EncryptionData>,
    ) -> Self {
        Self {
            package,
            navigation,
            encryption,
        }
    }

    /// Opens an [`Epub`] from the given [`Archive`] with default [`EpubOpenOptions`].
    ///
    /// # Errors
    /// - [`ArchiveError`](crate::ebook::errors::EbookError::Archive):
    ///   Missing container or package document.
    /// - [`FormatError`](crate::ebook::errors::EbookError::Format):
    ///   Malformed or structurally invalid EPUB content.
    ///
    /// # See Also
    /// - [`Self::open_with`] to specify options.
    pub async fn open(archive: &dyn Archive) -> EbookResult<Self> {
        Self::open_with(archive, EpubOpenOptions::default()).await
    }

    /// Opens an [`Epub`] from the given [`Archive`] with the specified [`EpubOpenOptions`].
    ///
    /// See [`Self::open`] for more details.
    ///
    /// # Examples
    /// - Skipping navigation parsing:
    /// ```
    /// # use bindery::epub::{Epub, EpubOpenOptions};
    /// # use bindery::ebook::archive::DirectoryArchive;
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let archive = DirectoryArchive::new("tests/ebooks/example_epub")?;
    /// let epub = Epub::open_with(
    ///     &archive,
    ///     EpubOpenOptions::builder()
    ///         .navigation(false)
    ///         .check_mimetype(false),
    /// )
    /// .await?;
    ///
    /// assert!(epub.navigation().is_none());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn open_with(
        archive: &dyn Archive,
        options: impl Into<EpubOpenOptions>,
    ) -> EbookResult<Self> {
        let options = options.into();
        let epub = EpubParser::new(&options, archive).parse().await?;

        tracing::debug!(
            package = epub.package.path(),
            version = epub.version(),
            navigation = epub.navigation.is_some(),
            encrypted = epub.encryption.as_ref().map_or(0, EncryptionData::len),
            "opened epub"
        );
        Ok(epub)
    }

    /// The parsed package document (`.opf`).
    pub fn package(&self) -> &PackageDocument {
        &self.package
    }

    /// The navigation structures, if a navigation document or NCX was found.
    pub fn navigation(&self) -> Option<&NavigationData> {
        self.navigation.as_ref()
    }

    /// The encryption map from `META-INF/encryption.xml`, if present.
    pub fn encryption(&self) -> Option<&EncryptionData> {
        self.encryption.as_ref()
    }

    /// Returns the declared encryption of the resource at `href`.
    ///
    /// The href is canonicalized before lookup.
    pub fn encryption_for(&self, href: &str) -> Option<&Encryption> {
        self.encryption.as_ref().and_then(|encryption| encryption.get(href))
    }

    /// Shorthand for the package document version.
    pub fn version(&self) -> f64 {
        self.package.version()
    }
}

/// Options upon opening an [`Epub`].
///
/// To create a mutable options instance, see
/// [`EpubOpenOptions::builder`] or [`EpubOpenOptions::default`].
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct EpubOpenOptions {
    /// Parse the navigation document, or the NCX as a fallback.
    ///
    /// Default: `true`
    pub navigation: bool,
    /// Parse `META-INF/encryption.xml` when present.
    ///
    /// When disabled, every resource is treated as unencrypted.
    ///
    /// Default: `true`
    pub encryption: bool,
    /// Check the `mimetype` entry, logging a warning when it is
    /// absent or differs from `application/epub+zip`.
    ///
    /// A mismatch never fails opening.
    ///
    /// Default: `true`
    pub check_mimetype: bool,
}

impl EpubOpenOptions {
    /// Returns a builder to create an [`EpubOpenOptions`] instance.
    pub fn builder() -> EpubOpenOptionsBuilder {
        EpubOpenOptionsBuilder(Self::default())
    }
}

impl Default for EpubOpenOptions {
    fn default() -> Self {
        Self {
            navigation: true,
            encryption: true,
            check_mimetype: true,
        }
    }
}

impl From<EpubOpenOptionsBuilder> for EpubOpenOptions {
    fn from(value: EpubOpenOptionsBuilder) -> Self {
        value.build()
    }
}

/// Builder to construct an [`EpubOpenOptions`] instance.
#[derive(Clone, Debug)]
pub struct EpubOpenOptionsBuilder(EpubOpenOptions);

impl EpubOpenOptionsBuilder {
    /// Turn this builder into an [`EpubOpenOptions`] instance.
    pub fn build(self) -> EpubOpenOptions {
        self.0
    }

    /// See [`EpubOpenOptions::navigation`].
    pub fn navigation(mut self, navigation: bool) -> Self {
        self.0.navigation = navigation;
        self
    }

    /// See [`EpubOpenOptions::encryption`].
    pub fn encryption(mut self, encryption: bool) -> Self {
        self.0.encryption = encryption;
        self
    }

    /// See [`EpubOpenOptions::check_mimetype`].
    pub fn check_mimetype(mut self, check_mimetype: bool) -> Self {
        self.0.check_mimetype = check_mimetype;
        self
    }
}
