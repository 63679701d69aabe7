//! Navigation structures: the EPUB 3 navigation document and the legacy NCX.

use crate::ebook::link::Link;

/// The `<nav>` collections of an EPUB 3 navigation document.
///
/// Link hrefs are container paths resolved against the navigation document,
/// keeping any `#fragment`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavigationDocument {
    /// `epub:type="toc"`
    pub toc: Vec<Link>,
    /// `epub:type="page-list"`
    pub page_list: Vec<Link>,
    /// `epub:type="landmarks"`
    pub landmarks: Vec<Link>,
    /// `epub:type="loi"` (list of illustrations)
    pub loi: Vec<Link>,
    /// `epub:type="lot"` (list of tables)
    pub lot: Vec<Link>,
    /// `epub:type="loa"` (list of audio)
    pub loa: Vec<Link>,
    /// `epub:type="lov"` (list of videos)
    pub lov: Vec<Link>,
}

/// The `navMap` and `pageList` of a legacy NCX document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ncx {
    pub toc: Vec<Link>,
    pub page_list: Vec<Link>,
}

/// The navigation structure of a publication; exactly one form is held.
#[derive(Clone, Debug, PartialEq)]
pub enum NavigationData {
    /// An EPUB 3 navigation document.
    Document(NavigationDocument),
    /// A legacy NCX document.
    Ncx(Ncx),
}

impl NavigationData {
    /// Chooses the navigation structure of a publication.
    ///
    /// The navigation document is always preferred when present;
    /// the NCX is only used in its absence.
    /// [`None`] is returned when neither is available.
    ///
    /// # Examples
    /// - Preferring the navigation document:
    /// ```
    /// # use bindery::epub::navigation::{NavigationData, NavigationDocument, Ncx};
    /// let resolved = NavigationData::resolve(Some(NavigationDocument::default()), Some(Ncx::default()));
    /// assert!(matches!(resolved, Some(NavigationData::Document(_))));
    ///
    /// let resolved = NavigationData::resolve(None, Some(Ncx::default()));
    /// assert!(matches!(resolved, Some(NavigationData::Ncx(_))));
    ///
    /// assert_eq!(None, NavigationData::resolve(None, None));
    /// ```
    pub fn resolve(document: Option<NavigationDocument>, ncx: Option<Ncx>) -> Option<Self> {
        document.map(Self::Document).or_else(|| ncx.map(Self::Ncx))
    }

    /// The table of contents.
    pub fn toc(&self) -> &[Link] {
        match self {
            Self::Document(document) => &document.toc,
            Self::Ncx(ncx) => &ncx.toc,
        }
    }

    pub fn page_list(&self) -> &[Link] {
        match self {
            Self::Document(document) => &document.page_list,
            Self::Ncx(ncx) => &ncx.page_list,
        }
    }

    /// Landmarks; always empty for an NCX.
    pub fn landmarks(&self) -> &[Link] {
        match self {
            Self::Document(document) => &document.landmarks,
            Self::Ncx(_) => &[],
        }
    }

    /// The list of illustrations; always empty for an NCX.
    pub fn loi(&self) -> &[Link] {
        self.document_links(|document| &document.loi)
    }

    /// The list of tables; always empty for an NCX.
    pub fn lot(&self) -> &[Link] {
        self.document_links(|document| &document.lot)
    }

    /// The list of audio clips; always empty for an NCX.
    pub fn loa(&self) -> &[Link] {
        self.document_links(|document| &document.loa)
    }

    /// The list of videos; always empty for an NCX.
    pub fn lov(&self) -> &[Link] {
        self.document_links(|document| &document.lov)
    }

    fn document_links(&self, links: impl FnOnce(&NavigationDocument) -> &Vec<Link>) -> &[Link] {
        match self {
            Self::Document(document) => links(document),
            Self::Ncx(_) => &[],
        }
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Self::Document(_))
    }

    pub fn is_ncx(&self) -> bool {
        matches!(self, Self::Ncx(_))
    }
}
