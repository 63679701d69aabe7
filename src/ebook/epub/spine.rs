//! The spine: the default reading order of a package.

use crate::ebook::named::NamedEnum;
use std::fmt::Display;

/// The global direction in which content flows, declared by
/// `page-progression-direction`:
/// [`left-to-right (ltr)`](Direction::Ltr),
/// [`right-to-left (rtl)`](Direction::Rtl),
/// and [`no preference (default)`](Direction::Default).
///
/// Unknown or missing values resolve to [`Direction::Default`]
/// through [`NamedEnum::from_name_or_default`].
///
/// Default: [`Direction::Default`]
#[derive(Copy, Clone, Debug, Default, Hash, PartialEq, Eq)]
pub enum Direction {
    /// No specified direction preference (`default`).
    #[default]
    Default,
    /// Content flows from left-to-right (`ltr`).
    Ltr,
    /// Content flows from right-to-left (`rtl`).
    Rtl,
}

impl NamedEnum for Direction {
    const KIND: &'static str = "direction";
    const DEFAULT: Self = Self::Default;
    const ENTRIES: &'static [(&'static str, Self)] = &[
        ("default", Self::Default),
        ("ltr", Self::Ltr),
        ("rtl", Self::Rtl),
    ];
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A reference from the [`Spine`] to a manifest [`Item`](super::manifest::Item).
#[derive(Clone, Debug, PartialEq)]
pub struct Itemref {
    idref: String,
    linear: bool,
    properties: Vec<String>,
}

impl Itemref {
    /// Creates a linear itemref pointing to the manifest item with the given id.
    pub fn new(idref: impl Into<String>) -> Self {
        Self {
            idref: idref.into(),
            linear: true,
            properties: Vec::new(),
        }
    }

    /// Sets whether the referenced content is part of the primary reading order.
    pub fn with_linear(mut self, linear: bool) -> Self {
        self.linear = linear;
        self
    }

    /// Sets the properties, such as `page-spread-left`.
    pub fn with_properties(mut self, properties: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.properties = properties.into_iter().map(Into::into).collect();
        self
    }

    /// The id of the referenced manifest item.
    pub fn idref(&self) -> &str {
        &self.idref
    }

    /// Returns `false` when the content is auxiliary (`linear="no"`).
    pub fn is_linear(&self) -> bool {
        self.linear
    }

    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p == property)
    }
}

/// The ordered [`Itemref`] list making up the reading order, along with its
/// [`Direction`] and the id of a legacy (NCX) table of contents.
///
/// A spine only records references;
/// [`PackageDocument::new`](super::package::PackageDocument::new)
/// guarantees every reference resolves.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Spine {
    itemrefs: Vec<Itemref>,
    direction: Direction,
    toc: Option<String>,
}

impl Spine {
    pub fn new(itemrefs: Vec<Itemref>, direction: Direction, toc: Option<String>) -> Self {
        Self {
            itemrefs,
            direction,
            toc,
        }
    }

    /// Every itemref in reading order, including non-linear ones.
    pub fn itemrefs(&self) -> &[Itemref] {
        &self.itemrefs
    }

    /// Itemrefs belonging to the primary reading order.
    pub fn linear(&self) -> impl Iterator<Item = &Itemref> {
        self.itemrefs.iter().filter(|itemref| itemref.is_linear())
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The manifest id of the NCX document, if declared.
    pub fn toc(&self) -> Option<&str> {
        self.toc.as_deref()
    }

    /// The position of the first itemref referencing `idref`.
    pub fn position(&self, idref: &str) -> Option<usize> {
        self.itemrefs.iter().position(|itemref| itemref.idref == idref)
    }

    pub fn len(&self) -> usize {
        self.itemrefs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.itemrefs.is_empty()
    }
}
