use crate::ebook::epub::consts;
use crate::ebook::epub::errors::EpubError;
use crate::ebook::epub::manifest::Item;
use crate::ebook::epub::metadata::{MetaEntry, Metadata};
use crate::ebook::epub::package::PackageDocument;
use crate::ebook::epub::parser::EpubParser;
use crate::ebook::epub::spine::{Direction, Itemref, Spine};
use crate::ebook::named::NamedEnum;
use crate::parser::ParserResult;
use crate::parser::xml::{XmlElement, XmlEvent, XmlNamespace, XmlReader};
use crate::util::str::split_tokens;

impl EpubParser<'_> {
    /// Parses the package document located at the container path `path`.
    pub(super) fn parse_package(path: &str, data: &[u8]) -> ParserResult<PackageDocument> {
        let mut reader = XmlReader::new(data);
        let mut package = None;
        let mut metadata = None;
        let mut items = Vec::new();
        let mut itemrefs = Vec::new();
        let mut spine = (Direction::Default, None);

        while let Some(event) = reader.next() {
            let XmlEvent::Start(el) = event? else {
                continue;
            };

            match el.local_name() {
                consts::PACKAGE => package = Some(Self::parse_package_attributes(&el)?),
                consts::METADATA => metadata = Some(Self::parse_metadata(&mut reader)?),
                consts::ITEM => items.push(Self::parse_item(&el)?),
                consts::SPINE => {
                    let direction = el
                        .attribute(consts::PAGE_PROGRESSION_DIRECTION)
                        .map_or(Direction::Default, Direction::from_name_or_default);
                    let toc = el.attribute(consts::TOC).map(str::to_owned);

                    spine = (direction, toc);
                }
                consts::ITEMREF => itemrefs.push(Self::parse_itemref(&el)?),
                _ => {}
            }
        }

        let (version, unique_identifier) = package.ok_or(EpubError::NoPackageFound)?;
        let metadata = Metadata::new(unique_identifier, metadata.unwrap_or_default());
        let (direction, toc) = spine;

        Ok(PackageDocument::new(
            path,
            version,
            metadata,
            items,
            Spine::new(itemrefs, direction, toc),
        )?)
    }

    /// Returns the version and the `unique-identifier` reference.
    fn parse_package_attributes(el: &XmlElement) -> ParserResult<(f64, Option<String>)> {
        let raw = Self::require_attribute(el, consts::VERSION, "package[*version]")?.trim();
        let version = raw
            .parse::<f64>()
            .ok()
            .filter(|version| version.is_finite())
            .ok_or_else(|| EpubError::InvalidVersion(raw.to_owned()))?;

        Ok((version, el.attribute(consts::UNIQUE_ID).map(str::to_owned)))
    }

    /// Parses the children of `<metadata>`, consuming its end tag.
    fn parse_metadata(reader: &mut XmlReader) -> ParserResult<Vec<MetaEntry>> {
        let mut entries = Vec::new();

        while let Some(event) = reader.next() {
            let el = match event? {
                XmlEvent::Start(el) => el,
                XmlEvent::End(_) => break,
                XmlEvent::Text(_) => continue,
            };
            let entry = if el.name.namespace == Some(XmlNamespace::Dc) {
                let property = format!("dc:{}", el.local_name());
                MetaEntry::new(property, reader.read_text()?)
            } else if el.local_name() == consts::META {
                match (el.attribute(consts::PROPERTY), el.attribute(consts::NAME)) {
                    (Some(property), _) => MetaEntry::new(property.trim(), reader.read_text()?),
                    // Legacy form: <meta name="cover" content="cover-image"/>
                    (None, Some(name)) => {
                        let content = el.attribute(consts::CONTENT).unwrap_or_default();
                        reader.skip_element()?;
                        MetaEntry::new(name.trim(), content.trim())
                    }
                    (None, None) => {
                        reader.skip_element()?;
                        continue;
                    }
                }
            } else {
                reader.skip_element()?;
                continue;
            };

            entries.push(Self::with_meta_attributes(entry, &el));
        }
        Ok(entries)
    }

    fn with_meta_attributes(mut entry: MetaEntry, el: &XmlElement) -> MetaEntry {
        if let Some(id) = el.attribute(consts::ID) {
            entry = entry.with_id(id);
        }
        if let Some(refines) = el.attribute(consts::REFINES) {
            entry = entry.with_refines(refines.trim());
        }
        if let Some(language) = el.attribute_ns(XmlNamespace::Xml, consts::LANG) {
            entry = entry.with_language(language);
        }
        entry
    }

    fn parse_item(el: &XmlElement) -> ParserResult<Item> {
        let id = Self::require_attribute(el, consts::ID, "manifest > item[*id]")?;
        let href = Self::require_attribute(el, consts::HREF, "manifest > item[*href]")?;
        let mut item = Item::new(id.trim(), href.trim());

        if let Some(media_type) = el.attribute(consts::MEDIA_TYPE) {
            // Lowercase to enforce uniformity
            item = item.with_media_type(media_type.trim().to_ascii_lowercase());
        }
        if let Some(fallback) = el.attribute(consts::FALLBACK) {
            item = item.with_fallback(fallback.trim());
        }
        if let Some(overlay) = el.attribute(consts::MEDIA_OVERLAY) {
            item = item.with_media_overlay(overlay.trim());
        }
        if let Some(properties) = el.attribute(consts::PROPERTIES) {
            item = item.with_properties(split_tokens(properties));
        }
        Ok(item)
    }

    fn parse_itemref(el: &XmlElement) -> ParserResult<Itemref> {
        let idref = Self::require_attribute(el, consts::IDREF, "spine > itemref[*idref]")?;
        let linear = el.attribute(consts::LINEAR).map(str::trim) != Some("no");
        let mut itemref = Itemref::new(idref.trim()).with_linear(linear);

        if let Some(properties) = el.attribute(consts::PROPERTIES) {
            itemref = itemref.with_properties(split_tokens(properties));
        }
        Ok(itemref)
    }
}
