mod container;
mod encryption;
mod navigation;
mod package;

use crate::ebook::archive::Archive;
use crate::ebook::archive::errors::{ArchiveError, ArchiveResult};
use crate::ebook::epub::errors::EpubError;
use crate::ebook::epub::navigation::NavigationData;
use crate::ebook::epub::package::PackageDocument;
use crate::ebook::epub::{Epub, EpubOpenOptions, consts};
use crate::ebook::errors::EbookResult;
use crate::parser::ParserResult;
use crate::parser::xml::XmlElement;
use crate::util::uri;

pub(super) struct EpubParser<'a> {
    options: &'a EpubOpenOptions,
    archive: &'a dyn Archive,
}

impl<'a> EpubParser<'a> {
    pub(super) fn new(options: &'a EpubOpenOptions, archive: &'a dyn Archive) -> Self {
        Self { options, archive }
    }

    pub(super) async fn parse(&self) -> EbookResult<Epub> {
        if self.options.check_mimetype {
            self.check_mimetype().await;
        }

        // Parse "META-INF/container.xml"
        let container = self.archive.read(consts::CONTAINER).await?;
        let package_path = Self::parse_container(&container)?;
        tracing::debug!(package = package_path.as_str(), "located package document");

        // Parse "package.opf"
        let package_content = self.archive.read(&package_path).await?;
        let package = Self::parse_package(&package_path, &package_content)?;

        // Parse "toc.xhtml/ncx"
        let navigation = if self.options.navigation {
            self.parse_navigation(&package).await?
        } else {
            None
        };

        // Parse "META-INF/encryption.xml"
        let mut encryption = None;
        if self.options.encryption {
            if let Some(content) = self.read_optional(consts::ENCRYPTION).await? {
                encryption = Some(Self::parse_encryption(&content)?);
            }
        }

        Ok(Epub::new(package, navigation, encryption))
    }

    async fn check_mimetype(&self) {
        match self.archive.read(consts::MIMETYPE).await {
            Ok(content) if content.trim_ascii() == consts::EPUB_TYPE.as_bytes() => {}
            Ok(content) => tracing::warn!(
                found = %String::from_utf8_lossy(&content),
                expected = consts::EPUB_TYPE,
                "unexpected `mimetype` content"
            ),
            Err(error) => tracing::warn!(%error, "unreadable `mimetype` entry"),
        }
    }

    async fn parse_navigation(&self, package: &PackageDocument) -> EbookResult<Option<NavigationData>> {
        let manifest = package.manifest();
        let mut document = None;
        let mut ncx = None;

        if let Some(nav) = manifest.nav() {
            if let Some(content) = self.read_optional(nav.href()).await? {
                document = Some(Self::parse_navigation_document(nav.href(), &content)?);
            }
        }
        if document.is_none() {
            let ncx_item = package.ncx().or_else(|| {
                manifest
                    .items()
                    .iter()
                    .find(|item| item.media_type() == Some(consts::NCX_TYPE))
            });

            if let Some(item) = ncx_item {
                if let Some(content) = self.read_optional(item.href()).await? {
                    ncx = Some(Self::parse_ncx(item.href(), &content)?);
                }
            }
        }

        let navigation = NavigationData::resolve(document, ncx);
        if navigation.is_none() {
            tracing::warn!(package = package.path(), "no navigation document or NCX available");
        }
        Ok(navigation)
    }

    /// Reads an entry whose absence is tolerated.
    async fn read_optional(&self, path: &str) -> ArchiveResult<Option<Vec<u8>>> {
        match self.archive.read(path).await {
            Ok(content) => Ok(Some(content)),
            Err(ArchiveError::NotFound { .. }) => {
                tracing::debug!(path, "optional entry not found");
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    // Helper methods
    fn require_attribute<'el>(
        element: &'el XmlElement,
        name: &str,
        context: &'static str,
    ) -> ParserResult<&'el str> {
        element
            .attribute(name)
            .ok_or_else(|| EpubError::MissingAttribute(context.to_owned()).into())
    }

    /// Resolves an href found within the document at `base` to a container path,
    /// keeping its `#fragment`.
    fn resolve_href(base: &str, href: &str) -> String {
        let resolved = uri::resolve(uri::parent(base), href.trim());
        let (path, suffix) = uri::split_suffix(&resolved);
        let fragment = suffix.find('#').map_or("", |index| &suffix[index..]);

        uri::canonicalize(path) + fragment
    }
}
