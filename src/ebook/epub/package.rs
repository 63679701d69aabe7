//! The package document (`.opf`): metadata, manifest and spine.

use crate::ebook::epub::errors::{EpubError, EpubResult};
use crate::ebook::epub::manifest::{Item, Manifest};
use crate::ebook::epub::metadata::Metadata;
use crate::ebook::epub::spine::Spine;
use crate::util::uri;

/// The parsed `<package>` of a publication.
///
/// A `PackageDocument` is only ever constructed through [`PackageDocument::new`],
/// which checks every cross-reference, so a value in hand is always consistent:
/// - manifest ids are unique,
/// - every spine itemref and the spine `toc` resolve to a manifest item,
/// - every fallback and media overlay resolves, and no fallback chain loops.
///
/// # Examples
/// - Building a package document:
/// ```
/// # use bindery::epub::manifest::Item;
/// # use bindery::epub::metadata::Metadata;
/// # use bindery::epub::package::PackageDocument;
/// # use bindery::epub::spine::{Direction, Itemref, Spine};
/// # fn main() -> bindery::ebook::errors::EpubResult<()> {
/// let package = PackageDocument::new(
///     "OEBPS/content.opf",
///     3.0,
///     Metadata::default(),
///     vec![
///         Item::new("cover", "images/cover.jpg").with_media_type("image/jpeg"),
///         Item::new("c1", "text/c1.xhtml").with_media_type("application/xhtml+xml"),
///     ],
///     Spine::new(vec![Itemref::new("c1")], Direction::Ltr, None),
/// )?;
///
/// // Hrefs are resolved against the package directory
/// let item = package.manifest().by_id("c1").unwrap();
/// assert_eq!("OEBPS/text/c1.xhtml", item.href());
/// assert_eq!(vec!["OEBPS/text/c1.xhtml"], package.reading_order().map(Item::href).collect::<Vec<_>>());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PackageDocument {
    path: String,
    version: f64,
    metadata: Metadata,
    manifest: Manifest,
    spine: Spine,
}

impl PackageDocument {
    /// Assembles a package document from parsed parts.
    ///
    /// `path` is the container path of the package document.
    /// Item hrefs are taken as declared (relative to `path`) and are
    /// resolved to canonical container paths.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// 1. [`EpubError::DuplicateItemId`]
    /// 2. [`EpubError::UnresolvedSpineReference`]
    /// 3. [`EpubError::UnresolvedFallbackReference`],
    ///    [`EpubError::UnresolvedMediaOverlayReference`],
    ///    [`EpubError::CyclicFallbackChain`]
    /// 4. [`EpubError::UnresolvedTocReference`]
    pub fn new(
        path: impl Into<String>,
        version: f64,
        metadata: Metadata,
        items: Vec<Item>,
        spine: Spine,
    ) -> EpubResult<Self> {
        let path = uri::canonicalize(&path.into());
        let package_dir = uri::parent(&path);
        let items = items
            .into_iter()
            .map(|mut item| {
                let href = uri::canonicalize(&uri::resolve(package_dir, item.href()));
                item.set_href(href);
                item
            })
            .collect();
        let manifest = Manifest::new(items)?;

        if let Some(itemref) = spine
            .itemrefs()
            .iter()
            .find(|itemref| !manifest.contains(itemref.idref()))
        {
            return Err(EpubError::UnresolvedSpineReference(itemref.idref().to_owned()));
        }
        manifest.validate_references()?;

        if let Some(toc) = spine.toc().filter(|toc| !manifest.contains(toc)) {
            return Err(EpubError::UnresolvedTocReference(toc.to_owned()));
        }

        Ok(Self {
            path,
            version,
            metadata,
            manifest,
            spine,
        })
    }

    /// The container path of the package document, such as `OEBPS/content.opf`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The directory containing the package document; empty at the container root.
    pub fn directory(&self) -> &str {
        uri::parent(&self.path)
    }

    /// The declared EPUB version, such as `2.0` or `3.0`.
    pub fn version(&self) -> f64 {
        self.version
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn spine(&self) -> &Spine {
        &self.spine
    }

    /// The manifest items referenced by linear itemrefs, in reading order.
    pub fn reading_order(&self) -> impl Iterator<Item = &Item> {
        self.spine
            .linear()
            .filter_map(|itemref| self.manifest.by_id(itemref.idref()))
    }

    /// The cover image item: `properties="cover-image"`,
    /// falling back to the item named by a legacy `<meta name="cover">`.
    pub fn cover_image(&self) -> Option<&Item> {
        self.manifest.cover_image().or_else(|| {
            self.metadata
                .cover()
                .and_then(|id| self.manifest.by_id(id))
        })
    }

    /// The item of the NCX document named by the spine `toc` attribute.
    pub fn ncx(&self) -> Option<&Item> {
        self.spine.toc().and_then(|id| self.manifest.by_id(id))
    }
}
