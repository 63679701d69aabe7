mod ncx;
mod xhtml;

use crate::ebook::epub::parser::EpubParser;
use crate::ebook::link::Link;

impl EpubParser<'_> {
    /// Builds a navigation [`Link`], or [`None`] when neither an href nor a label is present.
    fn create_link(
        base: &str,
        href: Option<&str>,
        title: String,
        rels: Vec<String>,
        children: Vec<Link>,
    ) -> Option<Link> {
        let href = href.map(|href| Self::resolve_href(base, href));

        if href.is_none() && title.is_empty() && children.is_empty() {
            return None;
        }
        let mut link = Link::new(href.unwrap_or_default()).with_children(children);

        if !title.is_empty() {
            link = link.with_title(title);
        }
        if !rels.is_empty() {
            link = link.with_rels(rels);
        }
        Some(link)
    }
}
