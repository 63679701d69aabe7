//! Package metadata: Dublin Core elements and `<meta>` entries.

/// `dc:title`
pub const TITLE: &str = "dc:title";
/// `dc:identifier`
pub const IDENTIFIER: &str = "dc:identifier";
/// `dc:language`
pub const LANGUAGE: &str = "dc:language";
/// `dcterms:modified`
pub const MODIFIED: &str = "dcterms:modified";
/// Legacy `<meta name="cover" content="..."/>`, referencing a manifest id.
pub const COVER: &str = "cover";

/// A single metadata statement.
///
/// Dublin Core elements use a `dc:`-prefixed property, such as `dc:title`.
/// `<meta property="...">` and legacy `<meta name="..." content="...">`
/// entries keep their declared property or name.
#[derive(Clone, Debug, PartialEq)]
pub struct MetaEntry {
    id: Option<String>,
    property: String,
    value: String,
    refines: Option<String>,
    language: Option<String>,
}

impl MetaEntry {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: None,
            property: property.into(),
            value: value.into(),
            refines: None,
            language: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the refined element, such as `#creator01`.
    pub fn with_refines(mut self, refines: impl Into<String>) -> Self {
        self.refines = Some(refines.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// The refined element, including its leading `#`.
    pub fn refines(&self) -> Option<&str> {
        self.refines.as_deref()
    }

    /// The `xml:lang` of the entry.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

/// The `<metadata>` of a package document, in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    unique_identifier: Option<String>,
    entries: Vec<MetaEntry>,
}

impl Metadata {
    /// `unique_identifier` is the id of the `dc:identifier` entry
    /// named by `<package unique-identifier="...">`.
    pub fn new(unique_identifier: Option<String>, entries: Vec<MetaEntry>) -> Self {
        Self {
            unique_identifier,
            entries,
        }
    }

    pub fn entries(&self) -> &[MetaEntry] {
        &self.entries
    }

    /// Entries with the given property, in declaration order.
    pub fn by_property<'a>(&'a self, property: &'a str) -> impl Iterator<Item = &'a MetaEntry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.property == property)
    }

    /// Entries refining the element with the given id.
    pub fn refinements<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a MetaEntry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.refines().and_then(|r| r.strip_prefix('#')) == Some(id))
    }

    /// The first `dc:title`.
    pub fn title(&self) -> Option<&str> {
        self.by_property(TITLE).next().map(MetaEntry::value)
    }

    /// The publication identifier referenced by the package `unique-identifier`,
    /// falling back to the first `dc:identifier`.
    pub fn identifier(&self) -> Option<&str> {
        let mut identifiers = self.by_property(IDENTIFIER);
        let unique = self.unique_identifier.as_deref().and_then(|unique| {
            self.by_property(IDENTIFIER)
                .find(|entry| entry.id() == Some(unique))
        });

        unique.or_else(|| identifiers.next()).map(MetaEntry::value)
    }

    pub fn unique_identifier(&self) -> Option<&str> {
        self.unique_identifier.as_deref()
    }

    /// Every `dc:language`, in declaration order.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.by_property(LANGUAGE).map(MetaEntry::value)
    }

    /// The `dcterms:modified` timestamp, as declared.
    pub fn modified(&self) -> Option<&str> {
        self.by_property(MODIFIED)
            .find(|entry| entry.refines().is_none())
            .map(MetaEntry::value)
    }

    /// The manifest id named by a legacy `<meta name="cover">` entry.
    pub fn cover(&self) -> Option<&str> {
        self.by_property(COVER).next().map(MetaEntry::value)
    }
}
