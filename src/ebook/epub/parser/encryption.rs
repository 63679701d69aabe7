use crate::ebook::epub::consts;
use crate::ebook::epub::encryption::{Compression, Encryption, EncryptionData, algorithms};
use crate::ebook::epub::parser::EpubParser;
use crate::parser::ParserResult;
use crate::parser::xml::{XmlEvent, XmlNamespace, XmlReader};

/// Fields gathered from a single `<EncryptedData>`.
#[derive(Default)]
struct EncryptedData {
    algorithm: Option<String>,
    uri: Option<String>,
    retrieval: Option<(String, Option<String>)>,
    compression: Option<Compression>,
}

impl EncryptedData {
    fn into_entry(self) -> Option<(String, Encryption)> {
        let (Some(algorithm), Some(uri)) = (self.algorithm, self.uri) else {
            tracing::warn!("skipped `EncryptedData` lacking an algorithm or cipher reference");
            return None;
        };
        let mut encryption = Encryption::new(algorithm);

        if let Some((retrieval, kind)) = self.retrieval {
            if kind.as_deref() == Some(consts::LCP_CONTENT_KEY) {
                encryption = encryption.with_scheme(algorithms::LCP_SCHEME);
            }
            encryption = encryption.with_retrieval(retrieval);
        }
        if let Some(compression) = self.compression {
            encryption = encryption.with_compression(compression);
        }
        Some((uri, encryption))
    }
}

impl EpubParser<'_> {
    /// Parses `META-INF/encryption.xml`.
    ///
    /// Cipher reference URIs are relative to the container root.
    pub(super) fn parse_encryption(data: &[u8]) -> ParserResult<EncryptionData> {
        let mut reader = XmlReader::new(data);
        let mut entries = Vec::new();

        while let Some(event) = reader.next() {
            match event? {
                XmlEvent::Start(el) if el.is(XmlNamespace::Enc, consts::ENCRYPTED_DATA) => {
                    entries.extend(Self::parse_encrypted_data(&mut reader)?.into_entry());
                }
                _ => {}
            }
        }
        Ok(EncryptionData::from_entries(entries))
    }

    /// Parses the content of `<EncryptedData>`, consuming its end tag.
    fn parse_encrypted_data(reader: &mut XmlReader) -> ParserResult<EncryptedData> {
        let mut data = EncryptedData::default();
        let mut depth = 0_usize;

        while let Some(event) = reader.next() {
            let el = match event? {
                XmlEvent::Start(el) => el,
                XmlEvent::End(_) if depth == 0 => break,
                XmlEvent::End(_) => {
                    depth -= 1;
                    continue;
                }
                XmlEvent::Text(_) => continue,
            };
            depth += 1;

            let attribute = |name: &str| el.attribute(name).map(|value| value.trim().to_owned());

            match (el.name.namespace, el.local_name()) {
                (Some(XmlNamespace::Enc), consts::ENCRYPTION_METHOD) => {
                    data.algorithm = attribute(consts::ALGORITHM);
                }
                (Some(XmlNamespace::Enc), consts::CIPHER_REFERENCE) => {
                    data.uri = attribute(consts::URI);
                }
                (Some(XmlNamespace::Sig), consts::RETRIEVAL_METHOD) => {
                    data.retrieval = attribute(consts::URI)
                        .map(|uri| (uri, attribute(consts::RETRIEVAL_TYPE)));
                }
                (Some(XmlNamespace::Comp), consts::COMPRESSION) => {
                    let Some(method) = attribute(consts::METHOD) else {
                        continue;
                    };
                    let original_length = attribute(consts::ORIGINAL_LENGTH)
                        .and_then(|length| length.parse::<u64>().ok());

                    data.compression = Some(Compression::new(method, original_length));
                }
                _ => {}
            }
        }
        Ok(data)
    }
}
