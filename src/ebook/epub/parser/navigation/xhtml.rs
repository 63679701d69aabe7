use crate::ebook::epub::consts;
use crate::ebook::epub::navigation::NavigationDocument;
use crate::ebook::epub::parser::EpubParser;
use crate::ebook::link::Link;
use crate::parser::ParserResult;
use crate::parser::xml::{XmlEvent, XmlNamespace, XmlReader};
use crate::util::str::split_tokens;

impl EpubParser<'_> {
    /// Parses the EPUB 3 navigation document located at the container path `path`.
    pub(in crate::ebook::epub::parser) fn parse_navigation_document(
        path: &str,
        data: &[u8],
    ) -> ParserResult<NavigationDocument> {
        let mut reader = XmlReader::new(data);
        let mut document = NavigationDocument::default();

        while let Some(event) = reader.next() {
            let el = match event? {
                XmlEvent::Start(el) if el.local_name() == consts::NAV => el,
                _ => continue,
            };
            let kinds = el
                .attribute_ns(XmlNamespace::Ops, consts::EPUB_TYPE_ATTRIBUTE)
                .map(split_tokens)
                .unwrap_or_default();
            let links = Self::parse_nav(path, &mut reader)?;
            let kind = kinds.iter().map(String::as_str).find(|kind| {
                matches!(
                    *kind,
                    consts::TOC
                        | consts::PAGE_LIST
                        | consts::LANDMARKS
                        | consts::LOI
                        | consts::LOT
                        | consts::LOA
                        | consts::LOV
                )
            });
            let target = match kind {
                Some(consts::TOC) => Some(&mut document.toc),
                Some(consts::PAGE_LIST) => Some(&mut document.page_list),
                Some(consts::LANDMARKS) => Some(&mut document.landmarks),
                Some(consts::LOI) => Some(&mut document.loi),
                Some(consts::LOT) => Some(&mut document.lot),
                Some(consts::LOA) => Some(&mut document.loa),
                Some(consts::LOV) => Some(&mut document.lov),
                _ => None,
            };

            match target {
                // Only the first `nav` of each kind is kept
                Some(target) if target.is_empty() => *target = links,
                Some(_) => {}
                None => tracing::debug!(?kinds, "skipped unsupported `nav` element"),
            }
        }
        Ok(document)
    }

    /// Parses the content of a `<nav>`, consuming its end tag.
    fn parse_nav(path: &str, reader: &mut XmlReader) -> ParserResult<Vec<Link>> {
        let mut links = Vec::new();

        while let Some(event) = reader.next() {
            match event? {
                XmlEvent::Start(el) if el.local_name() == "ol" => {
                    links.extend(Self::parse_nav_list(path, reader)?);
                }
                XmlEvent::Start(_) => reader.skip_element()?,
                XmlEvent::End(_) => break,
                XmlEvent::Text(_) => {}
            }
        }
        Ok(links)
    }

    /// Parses the `<li>` children of an `<ol>`, consuming its end tag.
    fn parse_nav_list(path: &str, reader: &mut XmlReader) -> ParserResult<Vec<Link>> {
        let mut links = Vec::new();

        while let Some(event) = reader.next() {
            match event? {
                XmlEvent::Start(el) if el.local_name() == consts::LIST_ITEM => {
                    links.extend(Self::parse_nav_item(path, reader)?);
                }
                XmlEvent::Start(_) => reader.skip_element()?,
                XmlEvent::End(_) => break,
                XmlEvent::Text(_) => {}
            }
        }
        Ok(links)
    }

    /// Parses an `<li>` holding an `<a>` (or a `<span>` heading) and an optional nested `<ol>`.
    fn parse_nav_item(path: &str, reader: &mut XmlReader) -> ParserResult<Option<Link>> {
        let mut href = None;
        let mut title = String::new();
        let mut rels = Vec::new();
        let mut children = Vec::new();

        while let Some(event) = reader.next() {
            match event? {
                XmlEvent::Start(el) if matches!(el.local_name(), consts::ANCHOR | consts::SPAN) => {
                    href = el.attribute(consts::HREF).map(str::to_owned);
                    rels = el
                        .attribute_ns(XmlNamespace::Ops, consts::EPUB_TYPE_ATTRIBUTE)
                        .map(split_tokens)
                        .unwrap_or_default();
                    title = reader.read_text()?;
                }
                XmlEvent::Start(el) if el.local_name() == "ol" => {
                    children = Self::parse_nav_list(path, reader)?;
                }
                XmlEvent::Start(_) => reader.skip_element()?,
                XmlEvent::End(_) => break,
                XmlEvent::Text(_) => {}
            }
        }
        Ok(Self::create_link(path, href.as_deref(), title, rels, children))
    }
}
