use crate::ebook::epub::consts;
use crate::ebook::epub::errors::EpubError;
use crate::ebook::epub::parser::EpubParser;
use crate::parser::ParserResult;
use crate::parser::xml::{XmlEvent, XmlReader};
use crate::util::uri;

impl EpubParser<'_> {
    /// Parses `META-INF/container.xml` and retrieves the container path of the package document.
    pub(super) fn parse_container(data: &[u8]) -> ParserResult<String> {
        let mut reader = XmlReader::new(data);

        while let Some(event) = reader.next() {
            let el = match event? {
                XmlEvent::Start(el) if el.local_name() == consts::ROOT_FILE => el,
                _ => continue,
            };
            // Although rare, multiple renditions could exist.
            // Only accept the first package document as it is the default
            let (Some(consts::PACKAGE_TYPE), Some(full_path)) = (
                el.attribute(consts::MEDIA_TYPE).map(str::trim),
                el.attribute(consts::FULL_PATH),
            ) else {
                continue;
            };

            return Ok(uri::canonicalize(full_path.trim()));
        }
        Err(EpubError::NoOpfReference.into())
    }
}
