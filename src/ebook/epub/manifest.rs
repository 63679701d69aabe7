//! The manifest: every resource a package is made of.

use crate::ebook::epub::consts;
use crate::ebook::epub::errors::{EpubError, EpubResult};
use crate::util::uri;
use std::collections::{HashMap, HashSet};

/// A single manifest entry, declared by an `<item>` element.
///
/// Within a [`PackageDocument`](super::package::PackageDocument),
/// [`Item::href`] is the canonical container path, such as `OEBPS/text/ch1.xhtml`,
/// resolved against the directory of the package document.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    id: String,
    href: String,
    media_type: Option<String>,
    fallback: Option<String>,
    media_overlay: Option<String>,
    properties: Vec<String>,
}

impl Item {
    pub fn new(id: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            media_type: None,
            fallback: None,
            media_overlay: None,
            properties: Vec::new(),
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Sets the id of the item to substitute when this item's media type is unsupported.
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// Sets the id of the synchronized-audio (SMIL) item.
    pub fn with_media_overlay(mut self, media_overlay: impl Into<String>) -> Self {
        self.media_overlay = Some(media_overlay.into());
        self
    }

    pub fn with_properties(mut self, properties: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.properties = properties.into_iter().map(Into::into).collect();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    pub fn fallback(&self) -> Option<&str> {
        self.fallback.as_deref()
    }

    pub fn media_overlay(&self) -> Option<&str> {
        self.media_overlay.as_deref()
    }

    /// Property tags in declaration order, such as `nav` or `cover-image`.
    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p == property)
    }

    pub(super) fn set_href(&mut self, href: String) {
        self.href = href;
    }
}

/// The ordered set of manifest [`Item`]s, indexed by id and href.
///
/// # Examples
/// - Following a fallback chain:
/// ```
/// # use bindery::epub::manifest::{Item, Manifest};
/// # fn main() -> bindery::ebook::errors::EpubResult<()> {
/// let manifest = Manifest::new(vec![
///     Item::new("video", "media/clip.webm").with_fallback("anim"),
///     Item::new("anim", "media/clip.gif").with_fallback("still"),
///     Item::new("still", "media/clip.png"),
/// ])?;
/// manifest.validate_references()?;
///
/// let chain = manifest.fallbacks("video").map(|item| item.id()).collect::<Vec<_>>();
/// assert_eq!(vec!["anim", "still"], chain);
/// assert_eq!(Some("still"), manifest.by_href("/media/clip.png#frame").map(|i| i.id()));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Manifest {
    items: Vec<Item>,
    by_id: HashMap<String, usize>,
    by_href: HashMap<String, usize>,
}

impl Manifest {
    /// Indexes `items`, keeping their declaration order.
    ///
    /// Item hrefs are indexed as given and are expected to be canonical
    /// container paths, as produced by
    /// [`PackageDocument::new`](super::package::PackageDocument::new).
    /// References between items are checked separately by [`Self::validate_references`].
    ///
    /// # Errors
    /// [`EpubError::DuplicateItemId`] when two items share an id.
    pub fn new(items: Vec<Item>) -> EpubResult<Self> {
        let mut by_id = HashMap::with_capacity(items.len());
        let mut by_href = HashMap::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            if by_id.insert(item.id.clone(), index).is_some() {
                return Err(EpubError::DuplicateItemId(item.id.clone()));
            }
            // The first declaration wins for duplicate hrefs
            by_href.entry(item.href.clone()).or_insert(index);
        }

        Ok(Self {
            items,
            by_id,
            by_href,
        })
    }

    /// Ensures every `fallback` and `media-overlay` reference resolves
    /// and that no fallback chain revisits an item.
    ///
    /// # Errors
    /// - [`EpubError::UnresolvedFallbackReference`]
    /// - [`EpubError::UnresolvedMediaOverlayReference`]
    /// - [`EpubError::CyclicFallbackChain`]
    pub fn validate_references(&self) -> EpubResult<()> {
        for item in &self.items {
            if let Some(fallback) = item.fallback.as_deref().filter(|id| !self.contains(id)) {
                return Err(EpubError::UnresolvedFallbackReference {
                    item: item.id.clone(),
                    reference: fallback.to_owned(),
                });
            }
            if let Some(overlay) = item.media_overlay.as_deref().filter(|id| !self.contains(id)) {
                return Err(EpubError::UnresolvedMediaOverlayReference {
                    item: item.id.clone(),
                    reference: overlay.to_owned(),
                });
            }
        }

        // Each item has at most one outgoing fallback edge;
        // items known to reach a chain end are never walked twice.
        let mut terminates = HashSet::new();

        for item in &self.items {
            let mut visited = HashSet::new();
            let mut current = Some(item);

            while let Some(node) = current {
                if terminates.contains(node.id.as_str()) {
                    break;
                }
                if !visited.insert(node.id.as_str()) {
                    return Err(EpubError::CyclicFallbackChain(node.id.clone()));
                }
                current = node.fallback.as_deref().and_then(|id| self.by_id(id));
            }
            terminates.extend(visited);
        }
        Ok(())
    }

    /// Items in declaration order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn by_id(&self, id: &str) -> Option<&Item> {
        self.by_id.get(id).map(|&index| &self.items[index])
    }

    /// Returns the item at the given container path.
    ///
    /// `href` is canonicalized first; a leading `/`, percent-encoding,
    /// a `?query` and a `#fragment` do not affect the lookup.
    pub fn by_href(&self, href: &str) -> Option<&Item> {
        self.by_canonical_href(&uri::canonicalize(href))
    }

    /// Returns the item at the given canonical container path, taken verbatim.
    pub(crate) fn by_canonical_href(&self, href: &str) -> Option<&Item> {
        self.by_href.get(href).map(|&index| &self.items[index])
    }

    /// Items declaring the given property, in declaration order.
    pub fn by_property<'a>(&'a self, property: &'a str) -> impl Iterator<Item = &'a Item> + 'a {
        self.items
            .iter()
            .filter(move |item| item.has_property(property))
    }

    /// The navigation document item (`properties="nav"`).
    pub fn nav(&self) -> Option<&Item> {
        self.by_property(consts::NAV_PROPERTY).next()
    }

    /// The item with `properties="cover-image"`.
    pub fn cover_image(&self) -> Option<&Item> {
        self.by_property(consts::COVER_IMAGE).next()
    }

    /// Iterates the fallback chain of the item with the given id, excluding that item.
    ///
    /// Iteration stops at an unresolved reference,
    /// and never yields more items than the manifest holds.
    pub fn fallbacks<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Item> + 'a {
        let mut current = self.by_id(id);

        std::iter::from_fn(move || {
            let next = current?.fallback.as_deref().and_then(|id| self.by_id(id));
            current = next;
            next
        })
        .take(self.items.len())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
