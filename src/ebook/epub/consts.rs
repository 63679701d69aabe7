//! Well-known paths, media types and XML names of an EPUB container.

// Paths
/// Marks the zip as an EPUB container; holds [`EPUB_TYPE`].
pub const MIMETYPE: &str = "mimetype";
/// Locates the package document(s).
pub const CONTAINER: &str = "META-INF/container.xml";
/// Declares per-resource encryption and compression.
pub const ENCRYPTION: &str = "META-INF/encryption.xml";
/// An LCP license, when the publication is LCP-protected.
pub const LICENSE: &str = "META-INF/license.lcpl";

// Media types
pub const EPUB_TYPE: &str = "application/epub+zip";
pub const PACKAGE_TYPE: &str = "application/oebps-package+xml";
pub const NCX_TYPE: &str = "application/x-dtbncx+xml";
pub const SMIL_TYPE: &str = "application/smil+xml";
pub const XHTML_TYPE: &str = "application/xhtml+xml";

// Namespaces
pub const OPC_NAMESPACE: &str = "urn:oasis:names:tc:opendocument:xmlns:container";
pub const ENC_NAMESPACE: &str = "http://www.w3.org/2001/04/xmlenc#";
pub const SIG_NAMESPACE: &str = "http://www.w3.org/2000/09/xmldsig#";
pub const COMP_NAMESPACE: &str = "http://www.idpf.org/2016/encryption#compression";
pub const OPF_NAMESPACE: &str = "http://www.idpf.org/2007/opf";
pub const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";
pub const OPS_NAMESPACE: &str = "http://www.idpf.org/2007/ops";
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub const SMIL_NAMESPACE: &str = "http://www.w3.org/ns/SMIL";
pub const NCX_NAMESPACE: &str = "http://www.daisy.org/z3986/2005/ncx/";
pub(crate) const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

// General attributes
pub(crate) const ID: &str = "id";
pub(crate) const HREF: &str = "href";
pub(crate) const SRC: &str = "src";
pub(crate) const LANG: &str = "lang";
pub(crate) const TYPE: &str = "type";

// Container
pub(crate) const ROOT_FILE: &str = "rootfile";
pub(crate) const FULL_PATH: &str = "full-path";
pub(crate) const MEDIA_TYPE: &str = "media-type";

// Package
pub(crate) const PACKAGE: &str = "package";
pub(crate) const METADATA: &str = "metadata";
pub(crate) const SPINE: &str = "spine";
pub(crate) const VERSION: &str = "version";
pub(crate) const UNIQUE_ID: &str = "unique-identifier";

// Metadata
pub(crate) const META: &str = "meta";
pub(crate) const PROPERTY: &str = "property";
pub(crate) const NAME: &str = "name";
pub(crate) const CONTENT: &str = "content";
pub(crate) const REFINES: &str = "refines";

// Manifest
pub(crate) const ITEM: &str = "item";
pub(crate) const FALLBACK: &str = "fallback";
pub(crate) const MEDIA_OVERLAY: &str = "media-overlay";
pub(crate) const PROPERTIES: &str = "properties";
pub(crate) const COVER_IMAGE: &str = "cover-image";
pub(crate) const NAV_PROPERTY: &str = "nav";

// Spine
pub(crate) const ITEMREF: &str = "itemref";
pub(crate) const IDREF: &str = "idref";
pub(crate) const LINEAR: &str = "linear";
pub(crate) const TOC: &str = "toc";
pub(crate) const PAGE_PROGRESSION_DIRECTION: &str = "page-progression-direction";

// Navigation document
pub(crate) const NAV: &str = "nav";
pub(crate) const LIST_ITEM: &str = "li";
pub(crate) const ANCHOR: &str = "a";
pub(crate) const SPAN: &str = "span";
pub(crate) const EPUB_TYPE_ATTRIBUTE: &str = "type";
pub(crate) const PAGE_LIST: &str = "page-list";
pub(crate) const LANDMARKS: &str = "landmarks";
pub(crate) const LOI: &str = "loi";
pub(crate) const LOT: &str = "lot";
pub(crate) const LOA: &str = "loa";
pub(crate) const LOV: &str = "lov";

// NCX
pub(crate) const NAV_MAP: &str = "navMap";
pub(crate) const NAV_POINT: &str = "navPoint";
pub(crate) const NCX_PAGE_LIST: &str = "pageList";
pub(crate) const PAGE_TARGET: &str = "pageTarget";
pub(crate) const NAV_LABEL: &str = "navLabel";

// Encryption
pub(crate) const ENCRYPTED_DATA: &str = "EncryptedData";
pub(crate) const ENCRYPTION_METHOD: &str = "EncryptionMethod";
pub(crate) const ALGORITHM: &str = "Algorithm";
pub(crate) const CIPHER_REFERENCE: &str = "CipherReference";
pub(crate) const URI: &str = "URI";
pub(crate) const RETRIEVAL_METHOD: &str = "RetrievalMethod";
pub(crate) const RETRIEVAL_TYPE: &str = "Type";
pub(crate) const LCP_CONTENT_KEY: &str = "http://readium.org/2014/01/lcp#EncryptedContentKey";
pub(crate) const COMPRESSION: &str = "Compression";
pub(crate) const METHOD: &str = "Method";
pub(crate) const ORIGINAL_LENGTH: &str = "OriginalLength";
