//! Logical links to publication resources.

use crate::ebook::epub::encryption::Encryption;

/// A logical reference to a resource, such as a navigation entry or a
/// request passed to [`Fetcher::get`](crate::ebook::resource::Fetcher::get).
///
/// A link is plain data; building one performs no I/O and no validation.
/// Links returned by [`Resource::link`](crate::ebook::resource::Resource::link)
/// carry a canonical `href` along with the media type and [`Encryption`]
/// resolved from the package.
///
/// # Examples
/// - Creating a request link:
/// ```
/// # use bindery::Link;
/// let link = Link::new("OEBPS/c1.xhtml#section-2").with_title("Chapter 1");
///
/// assert_eq!("OEBPS/c1.xhtml#section-2", link.href());
/// assert_eq!(Some("Chapter 1"), link.title());
/// assert_eq!(None, link.media_type());
/// assert_eq!(link.href(), Link::from("OEBPS/c1.xhtml#section-2").href());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Link {
    href: String,
    media_type: Option<String>,
    title: Option<String>,
    rels: Vec<String>,
    encryption: Option<Encryption>,
    children: Vec<Link>,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the relations, such as `cover` or a landmark type like `bodymatter`.
    pub fn with_rels(mut self, rels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.rels = rels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_encryption(mut self, encryption: Encryption) -> Self {
        self.encryption = Some(encryption);
        self
    }

    pub fn with_children(mut self, children: Vec<Link>) -> Self {
        self.children = children;
        self
    }

    /// The referenced location; may include a `#fragment`.
    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn rels(&self) -> &[String] {
        &self.rels
    }

    pub fn has_rel(&self, rel: &str) -> bool {
        self.rels.iter().any(|r| r == rel)
    }

    /// How the referenced resource is encrypted, if at all.
    pub fn encryption(&self) -> Option<&Encryption> {
        self.encryption.as_ref()
    }

    /// Nested links, such as sub-sections of a table of contents entry.
    pub fn children(&self) -> &[Link] {
        &self.children
    }

    /// Replaces the href with its canonical form and fills in package-derived details.
    /// A media type already carried by the link is kept.
    pub(crate) fn into_resolved(
        mut self,
        href: String,
        media_type: Option<String>,
        encryption: Option<Encryption>,
    ) -> Self {
        self.href = href;
        self.media_type = self.media_type.or(media_type);
        self.encryption = encryption;
        self
    }

    /// Iterates this link and all of its descendants, depth-first in document order.
    pub fn flatten(&self) -> impl Iterator<Item = &Link> {
        let mut stack = vec![self];

        std::iter::from_fn(move || {
            let link = stack.pop()?;
            stack.extend(link.children.iter().rev());
            Some(link)
        })
    }
}

impl From<&str> for Link {
    fn from(href: &str) -> Self {
        Self::new(href)
    }
}

impl From<String> for Link {
    fn from(href: String) -> Self {
        Self::new(href)
    }
}

impl From<&Link> for Link {
    fn from(link: &Link) -> Self {
        link.clone()
    }
}
