//! A namespace-aware event reader over [`quick_xml`].
//!
//! Events own their data and carry resolved [`XmlNamespace`] values
//! instead of raw prefixes, so package, navigation and encryption
//! parsers can match on `(namespace, local name)` regardless of how
//! a document chooses its prefixes.

use crate::ebook::epub::consts;
use crate::ebook::errors::FormatError;
use crate::ebook::named::NamedEnum;
use crate::parser::ParserResult;
use crate::util::str::collapse_whitespace;
use quick_xml::Reader;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use std::borrow::Cow;
use std::str;

/// Namespaces the package parsers recognize.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub(crate) enum XmlNamespace {
    Opc,
    Enc,
    Sig,
    Comp,
    Opf,
    Dc,
    Ops,
    Xhtml,
    Smil,
    Ncx,
    Xml,
}

impl NamedEnum for XmlNamespace {
    const KIND: &'static str = "namespace";
    const DEFAULT: Self = Self::Xhtml;
    const ENTRIES: &'static [(&'static str, Self)] = &[
        (consts::OPC_NAMESPACE, Self::Opc),
        (consts::ENC_NAMESPACE, Self::Enc),
        (consts::SIG_NAMESPACE, Self::Sig),
        (consts::COMP_NAMESPACE, Self::Comp),
        (consts::OPF_NAMESPACE, Self::Opf),
        (consts::DC_NAMESPACE, Self::Dc),
        (consts::OPS_NAMESPACE, Self::Ops),
        (consts::XHTML_NAMESPACE, Self::Xhtml),
        (consts::SMIL_NAMESPACE, Self::Smil),
        (consts::NCX_NAMESPACE, Self::Ncx),
        (consts::XML_NAMESPACE, Self::Xml),
    ];
}

/// A resolved element or attribute name.
///
/// Unrecognized namespaces, and names without one, resolve to [`None`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct XmlName {
    pub(crate) namespace: Option<XmlNamespace>,
    pub(crate) local: String,
}

impl XmlName {
    pub(crate) fn is(&self, namespace: XmlNamespace, local: &str) -> bool {
        self.namespace == Some(namespace) && self.local == local
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct XmlAttribute {
    pub(crate) name: XmlName,
    pub(crate) value: String,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct XmlElement {
    pub(crate) name: XmlName,
    pub(crate) attributes: Vec<XmlAttribute>,
}

impl XmlElement {
    pub(crate) fn is(&self, namespace: XmlNamespace, local: &str) -> bool {
        self.name.is(namespace, local)
    }

    pub(crate) fn local_name(&self) -> &str {
        &self.name.local
    }

    /// Returns the value of an unprefixed attribute.
    pub(crate) fn attribute(&self, local: &str) -> Option<&str> {
        self.find_attribute(None, local)
    }

    /// Returns the value of a namespaced attribute, such as `epub:type` or `xml:lang`.
    pub(crate) fn attribute_ns(&self, namespace: XmlNamespace, local: &str) -> Option<&str> {
        self.find_attribute(Some(namespace), local)
    }

    fn find_attribute(&self, namespace: Option<XmlNamespace>, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name.namespace == namespace && attribute.name.local == local)
            .map(|attribute| attribute.value.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum XmlEvent {
    /// Self-closing elements are reported as a start immediately followed by an end.
    Start(XmlElement),
    End(XmlName),
    /// Unescaped character data; a single text run may be split across several events.
    Text(String),
}

/// Declared `(prefix, uri)` pairs; the empty prefix is the default namespace.
type Scope = Vec<(String, String)>;

pub(crate) struct XmlReader<'a> {
    reader: Reader<&'a [u8]>,
    scopes: Vec<Scope>,
    pending_end: Option<XmlName>,
}

impl<'a> XmlReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self {
            reader: Reader::from_reader(bytes),
            scopes: Vec::new(),
            pending_end: None,
        }
    }

    /// Iterator-like method to read the next [`XmlEvent`].
    ///
    /// Comments, declarations and processing instructions are skipped.
    pub(crate) fn next(&mut self) -> Option<ParserResult<XmlEvent>> {
        if let Some(name) = self.pending_end.take() {
            self.scopes.pop();
            return Some(Ok(XmlEvent::End(name)));
        }
        loop {
            let event = match self.reader.read_event() {
                Ok(Event::Eof) => return None,
                Ok(event) => event,
                Err(error) => return Some(Err(FormatError::unparsable(error))),
            };
            let result = match event {
                Event::Start(start) => self.start(&start).map(XmlEvent::Start),
                Event::Empty(start) => self.start(&start).map(|element| {
                    self.pending_end = Some(element.name.clone());
                    XmlEvent::Start(element)
                }),
                Event::End(end) => self.end(&end).map(XmlEvent::End),
                Event::Text(text) => {
                    to_str(&text).map(|text| XmlEvent::Text(unescape(text).into_owned()))
                }
                Event::CData(cdata) => to_str(&cdata).map(|text| XmlEvent::Text(text.to_owned())),
                Event::GeneralRef(reference) => {
                    to_str(&reference).map(|name| XmlEvent::Text(resolve_reference(name)))
                }
                _ => continue,
            };
            return Some(result);
        }
    }

    /// Consolidates all text up to the end of the element most recently started,
    /// including text nested within child elements.
    ///
    /// The end event of that element is consumed.
    pub(crate) fn read_text(&mut self) -> ParserResult<String> {
        let mut text = String::new();
        let mut depth = 0_usize;

        while let Some(event) = self.next() {
            match event? {
                XmlEvent::Start(_) => depth += 1,
                XmlEvent::End(_) if depth == 0 => break,
                XmlEvent::End(_) => depth -= 1,
                XmlEvent::Text(value) => text.push_str(&value),
            }
        }
        Ok(collapse_whitespace(&text))
    }

    /// Skips everything up to and including the end of the element most recently started.
    pub(crate) fn skip_element(&mut self) -> ParserResult<()> {
        let mut depth = 0_usize;

        while let Some(event) = self.next() {
            match event? {
                XmlEvent::Start(_) => depth += 1,
                XmlEvent::End(_) if depth == 0 => break,
                XmlEvent::End(_) => depth -= 1,
                XmlEvent::Text(_) => {}
            }
        }
        Ok(())
    }

    fn start(&mut self, start: &BytesStart) -> ParserResult<XmlElement> {
        let mut raw_attributes = Vec::new();
        let mut scope = Scope::new();

        for attribute in start.attributes() {
            let attribute = attribute.map_err(FormatError::unparsable)?;
            let key = to_str(attribute.key.as_ref())?;
            let value = unescape(to_str(&attribute.value)?).into_owned();

            match key.strip_prefix("xmlns") {
                Some("") => scope.push((String::new(), value)),
                Some(prefix) if prefix.starts_with(':') => {
                    scope.push((prefix[1..].to_owned(), value));
                }
                _ => raw_attributes.push((key.to_owned(), value)),
            }
        }
        self.scopes.push(scope);

        let name = self.resolve(to_str(start.name().as_ref())?, true);
        let attributes = raw_attributes
            .into_iter()
            .map(|(key, value)| XmlAttribute {
                name: self.resolve(&key, false),
                value,
            })
            .collect();

        Ok(XmlElement { name, attributes })
    }

    fn end(&mut self, end: &BytesEnd) -> ParserResult<XmlName> {
        let name = self.resolve(to_str(end.name().as_ref())?, true);
        self.scopes.pop();
        Ok(name)
    }

    /// Unprefixed attributes never take the default namespace.
    fn resolve(&self, qualified: &str, is_element: bool) -> XmlName {
        let (prefix, local) = match qualified.split_once(':') {
            Some((prefix, local)) => (prefix, local),
            None if is_element => ("", qualified),
            None => {
                return XmlName {
                    namespace: None,
                    local: qualified.to_owned(),
                };
            }
        };
        let uri = match prefix {
            "xml" => Some(consts::XML_NAMESPACE),
            _ => self
                .scopes
                .iter()
                .rev()
                .flatten()
                .find(|(declared, _)| declared == prefix)
                .map(|(_, uri)| uri.as_str()),
        };

        XmlName {
            namespace: uri.and_then(XmlNamespace::from_name_opt),
            local: local.to_owned(),
        }
    }
}

fn to_str(bytes: &[u8]) -> ParserResult<&str> {
    str::from_utf8(bytes).map_err(FormatError::unparsable)
}

/// Replaces predefined and numeric character references.
/// Unknown references are kept verbatim.
fn unescape(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }
    let mut unescaped = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find('&') {
        unescaped.push_str(&rest[..start]);
        rest = &rest[start..];

        match rest.find(';') {
            Some(end) => {
                unescaped.push_str(&resolve_reference(&rest[1..end]));
                rest = &rest[end + 1..];
            }
            None => break,
        }
    }
    unescaped.push_str(rest);
    Cow::Owned(unescaped)
}

/// Resolves the name of a reference, such as `amp` or `#x41`, excluding `&` and `;`.
fn resolve_reference(name: &str) -> String {
    let resolved = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => name.strip_prefix('#').and_then(|code| {
            match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => code.parse().ok(),
            }
            .and_then(char::from_u32)
        }),
    };

    resolved.map_or_else(|| format!("&{name};"), String::from)
}
