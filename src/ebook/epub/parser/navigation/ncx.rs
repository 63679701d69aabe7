use crate::ebook::epub::consts;
use crate::ebook::epub::navigation::Ncx;
use crate::ebook::epub::parser::EpubParser;
use crate::ebook::link::Link;
use crate::parser::ParserResult;
use crate::parser::xml::{XmlEvent, XmlReader};

impl EpubParser<'_> {
    /// Parses the legacy NCX document located at the container path `path`.
    pub(in crate::ebook::epub::parser) fn parse_ncx(path: &str, data: &[u8]) -> ParserResult<Ncx> {
        let mut reader = XmlReader::new(data);
        let mut ncx = Ncx::default();

        while let Some(event) = reader.next() {
            let XmlEvent::Start(el) = event? else {
                continue;
            };

            match el.local_name() {
                consts::NAV_MAP => ncx.toc = Self::parse_nav_points(path, &mut reader)?,
                consts::NCX_PAGE_LIST => ncx.page_list = Self::parse_nav_points(path, &mut reader)?,
                _ => {}
            }
        }
        Ok(ncx)
    }

    /// Parses `navPoint` or `pageTarget` children, consuming the parent end tag.
    fn parse_nav_points(path: &str, reader: &mut XmlReader) -> ParserResult<Vec<Link>> {
        let mut links = Vec::new();

        while let Some(event) = reader.next() {
            match event? {
                XmlEvent::Start(el)
                    if matches!(el.local_name(), consts::NAV_POINT | consts::PAGE_TARGET) =>
                {
                    let rels = el
                        .attribute(consts::TYPE)
                        .map(|kind| vec![kind.trim().to_owned()])
                        .unwrap_or_default();
                    links.extend(Self::parse_nav_point(path, rels, reader)?);
                }
                XmlEvent::Start(_) => reader.skip_element()?,
                XmlEvent::End(_) => break,
                XmlEvent::Text(_) => {}
            }
        }
        Ok(links)
    }

    fn parse_nav_point(
        path: &str,
        rels: Vec<String>,
        reader: &mut XmlReader,
    ) -> ParserResult<Option<Link>> {
        let mut src = None;
        let mut title = String::new();
        let mut children = Vec::new();

        while let Some(event) = reader.next() {
            match event? {
                XmlEvent::Start(el) => match el.local_name() {
                    consts::NAV_LABEL => title = reader.read_text()?,
                    consts::CONTENT => {
                        src = el.attribute(consts::SRC).map(str::to_owned);
                        reader.skip_element()?;
                    }
                    consts::NAV_POINT | consts::PAGE_TARGET => {
                        let rels = Vec::new();
                        children.extend(Self::parse_nav_point(path, rels, reader)?);
                    }
                    _ => reader.skip_element()?,
                },
                XmlEvent::End(_) => break,
                XmlEvent::Text(_) => {}
            }
        }
        Ok(Self::create_link(path, src.as_deref(), title, rels, children))
    }
}
