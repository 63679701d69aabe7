//! Error-related types for an [`Epub`](super::Epub).

/// Alias for `Result<T, EpubError>`.
pub type EpubResult<T> = Result<T, EpubError>;

/// Structural errors detected while building an [`Epub`](super::Epub).
///
/// Every variant is fatal to the package being built:
/// construction is all-or-nothing and no partial model is returned.
///
/// # Variants
/// ## Container Errors (`container.xml`)
/// - [`NoOpfReference`](EpubError::NoOpfReference)
/// ## Package Errors (`.opf`)
/// - [`NoPackageFound`](EpubError::NoPackageFound)
/// - [`InvalidVersion`](EpubError::InvalidVersion)
/// ### Manifest Errors
/// - [`DuplicateItemId`](EpubError::DuplicateItemId)
/// - [`UnresolvedFallbackReference`](EpubError::UnresolvedFallbackReference)
/// - [`UnresolvedMediaOverlayReference`](EpubError::UnresolvedMediaOverlayReference)
/// - [`CyclicFallbackChain`](EpubError::CyclicFallbackChain)
/// ### Spine Errors
/// - [`UnresolvedSpineReference`](EpubError::UnresolvedSpineReference)
/// - [`UnresolvedTocReference`](EpubError::UnresolvedTocReference)
/// ## General Errors
/// - [`MissingAttribute`](EpubError::MissingAttribute)
/// - [`UnknownEnumValue`](EpubError::UnknownEnumValue)
#[non_exhaustive]
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum EpubError {
    ////////////////////////////////////////////////////////////////////////////////
    // General
    ////////////////////////////////////////////////////////////////////////////////
    /// A required attribute is missing from an element.
    #[error("Required attribute missing: {0}")]
    MissingAttribute(String),

    /// A name is not part of a closed value set resolved in strict mode.
    ///
    /// # See Also
    /// - [`NamedEnum::from_name`](crate::ebook::named::NamedEnum::from_name)
    #[error("Unknown {kind} value: `{name}`")]
    UnknownEnumValue {
        /// The value set being resolved, such as `direction`.
        kind: &'static str,
        /// The unmapped name.
        name: String,
    },

    ////////////////////////////////////////////////////////////////////////////////
    // Within `META-INF/container.xml`
    ////////////////////////////////////////////////////////////////////////////////
    /// The container does not contain a `rootfile` pointing to a package document.
    ///
    /// Error Source: `META-INF/container.xml`
    #[error("Missing `rootfile` element referencing an `.opf` file in `META-INF/container.xml`")]
    NoOpfReference,

    ////////////////////////////////////////////////////////////////////////////////
    // Package-specific errors
    ////////////////////////////////////////////////////////////////////////////////
    /// The `package` element is not found.
    ///
    /// Error Source: `.opf` file
    #[error("Missing `package` element")]
    NoPackageFound,

    /// The `version` field on the `package` element is not a number.
    ///
    /// Error Source: `.opf` file
    #[error("Invalid package epub `version`: {0}")]
    InvalidVersion(String),

    ////////////////////////////////////////////////////////////////////////////////
    // Manifest-specific errors
    ////////////////////////////////////////////////////////////////////////////////
    /// Two manifest items share the same `id`.
    ///
    /// Error Source: `.opf` file
    #[error("Duplicate manifest `item` ID found: {0}")]
    DuplicateItemId(String),

    /// The `fallback` of a manifest item references a non-existent item.
    ///
    /// Error Source: `.opf` file
    #[error("Manifest item `{item}` has a `fallback` referencing a non-existent item: {reference}")]
    UnresolvedFallbackReference {
        /// The id of the item declaring the fallback.
        item: String,
        /// The unresolved id.
        reference: String,
    },

    /// The `media-overlay` of a manifest item references a non-existent item.
    ///
    /// Error Source: `.opf` file
    #[error(
        "Manifest item `{item}` has a `media-overlay` referencing a non-existent item: {reference}"
    )]
    UnresolvedMediaOverlayReference {
        /// The id of the item declaring the media overlay.
        item: String,
        /// The unresolved id.
        reference: String,
    },

    /// Following `fallback` references revisits an item.
    ///
    /// # Example
    /// ```xml
    /// <item id="a" href="a.webp" media-type="image/webp" fallback="b"/>
    /// <item id="b" href="b.avif" media-type="image/avif" fallback="a"/>
    /// ```
    ///
    /// Error Source: `.opf` file
    #[error("Cycle detected in manifest fallback chain; affected ID: {0}")]
    CyclicFallbackChain(String),

    ////////////////////////////////////////////////////////////////////////////////
    // Spine-specific errors
    ////////////////////////////////////////////////////////////////////////////////
    /// The `idref` of a spine `itemref` points to a non-existent manifest item.
    ///
    /// Error Source: `.opf` file
    #[error(
        "Invalid spine entry `idref` field that references a non-existent manifest entry by ID: {0}"
    )]
    UnresolvedSpineReference(String),

    /// The `toc` field on the `spine` element points to a non-existent manifest item.
    ///
    /// Error Source: `.opf` file
    #[error("Invalid spine `toc` field that references a non-existent manifest entry by ID: {0}")]
    UnresolvedTocReference(String),
}
