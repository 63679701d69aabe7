use crate::epub::util::{
    IDENTIFIER, TestArchive, example_entries, memory_example_epub, read_example_file,
};
use bindery::Epub;
use bindery::ebook::archive::{ArchiveError, MemoryArchive};
use bindery::ebook::errors::{EbookError, FormatError};
use bindery::epub::EpubOpenOptions;
use bindery::epub::errors::EpubError;
use bindery::epub::manifest::{Item, Manifest};
use bindery::epub::spine::Direction;
use wasm_bindgen_test::wasm_bindgen_test;

/// Replaces `from` with `to` within the example package document.
fn with_package_edit(from: &str, to: &str) -> MemoryArchive {
    let opf = String::from_utf8(read_example_file("EPUB/example.opf")).unwrap();
    assert!(opf.contains(from), "`{from}` not found in package");

    let mut archive = memory_example_epub();
    archive.insert("EPUB/example.opf", opf.replace(from, to));
    archive
}

#[tokio::test]
async fn test_package_document() {
    let (epub, _) = TestArchive::Directory.open().await;
    let package = epub.package();

    assert_eq!("EPUB/example.opf", package.path());
    assert_eq!("EPUB", package.directory());
    assert_eq!(3.0, package.version());
    assert_eq!(3.0, epub.version());
}

#[tokio::test]
async fn test_metadata() {
    let (epub, _) = TestArchive::Directory.open().await;
    let metadata = epub.package().metadata();

    assert_eq!(Some("Example EPUB"), metadata.title());
    assert_eq!(Some("uid"), metadata.unique_identifier());
    assert_eq!(Some(IDENTIFIER), metadata.identifier());
    assert_eq!(vec!["en", "fr"], metadata.languages().collect::<Vec<_>>());
    assert_eq!(Some("2025-01-01T00:00:00Z"), metadata.modified());
    assert_eq!(Some("cover"), metadata.cover());

    let role = metadata.refinements("author").next().unwrap();
    assert_eq!("role", role.property());
    assert_eq!("aut", role.value());
    assert_eq!(2, metadata.by_property("dc:identifier").count());
}

#[tokio::test]
async fn test_manifest() {
    let (epub, _) = TestArchive::Directory.open().await;
    let package = epub.package();
    let manifest = package.manifest();
    #[rustfmt::skip]
    let expected = [
        ("nav", "EPUB/toc.xhtml", "application/xhtml+xml"),
        ("ncx", "EPUB/toc.ncx", "application/x-dtbncx+xml"),
        ("c1", "EPUB/c1.xhtml", "application/xhtml+xml"),
        ("c2", "EPUB/c2.xhtml", "application/xhtml+xml"),
        ("style", "EPUB/style.css", "text/css"),
        ("cover", "EPUB/images/cover.png", "image/png"),
        ("figure", "EPUB/images/figure.svg", "image/svg+xml"),
        ("serif", "EPUB/fonts/serif.otf", "font/otf"),
    ];

    assert_eq!(expected.len(), manifest.len());

    for (item, (id, href, media_type)) in manifest.items().iter().zip(expected) {
        assert_eq!(id, item.id());
        assert_eq!(href, item.href());
        assert_eq!(Some(media_type), item.media_type());
        assert_eq!(Some(item), manifest.by_id(id));
        assert_eq!(Some(item), manifest.by_href(href));
    }

    // Lookups canonicalize the given href
    assert_eq!("c1", manifest.by_href("/EPUB/./c1.xhtml#start").unwrap().id());
    assert!(manifest.by_href("c1.xhtml").is_none());

    assert_eq!("nav", manifest.nav().unwrap().id());
    assert_eq!("cover", package.cover_image().unwrap().id());
    assert_eq!("ncx", package.ncx().unwrap().id());

    let fallbacks = manifest.fallbacks("figure").map(Item::id).collect::<Vec<_>>();
    assert_eq!(vec!["cover"], fallbacks);
}

#[tokio::test]
async fn test_spine() {
    let (epub, _) = TestArchive::Directory.open().await;
    let package = epub.package();
    let spine = package.spine();
    #[rustfmt::skip]
    let expected = [
        ("c1", true),
        ("nav", false),
        ("c2", true),
    ];

    assert_eq!(Direction::Ltr, spine.direction());
    assert_eq!(Some("ncx"), spine.toc());
    assert_eq!(expected.len(), spine.len());

    for (itemref, (idref, is_linear)) in spine.itemrefs().iter().zip(expected) {
        assert_eq!(idref, itemref.idref());
        assert_eq!(is_linear, itemref.is_linear());
    }

    let reading_order = package.reading_order().map(Item::href).collect::<Vec<_>>();
    assert_eq!(vec!["EPUB/c1.xhtml", "EPUB/c2.xhtml"], reading_order);
    assert_eq!(Some(2), spine.position("c2"));
}

#[tokio::test]
async fn test_archives_are_equivalent() {
    let (directory, _) = TestArchive::Directory.open().await;
    let (zip, _) = TestArchive::Zip.open().await;
    let memory = Epub::open(&memory_example_epub()).await.unwrap();

    assert_eq!(directory, zip);
    assert_eq!(*directory, memory);
}

#[tokio::test]
async fn test_open_options() {
    let archive = memory_example_epub();
    let epub = Epub::open_with(
        &archive,
        EpubOpenOptions::builder()
            .navigation(false)
            .encryption(false),
    )
    .await
    .unwrap();

    assert!(epub.navigation().is_none());
    assert!(epub.encryption().is_none());
    assert!(epub.encryption_for("EPUB/fonts/serif.otf").is_none());
}

#[tokio::test]
async fn test_mimetype_mismatch_is_tolerated() {
    let mut archive = memory_example_epub();
    archive.insert("mimetype", "application/zip");
    assert!(Epub::open(&archive).await.is_ok());

    let archive = example_entries()
        .into_iter()
        .filter(|(path, _)| path != "mimetype")
        .collect::<MemoryArchive>();
    assert!(Epub::open(&archive).await.is_ok());
}

#[tokio::test]
async fn test_missing_container() {
    let archive = MemoryArchive::from_iter([("mimetype", "application/epub+zip")]);

    assert!(matches!(
        Epub::open(&archive).await,
        Err(EbookError::Archive(ArchiveError::NotFound { path })) if path == "META-INF/container.xml"
    ));
}

#[tokio::test]
async fn test_missing_package() {
    let mut archive = memory_example_epub();
    archive.insert(
        "META-INF/container.xml",
        r#"<container xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
             <rootfiles><rootfile full-path="OPS/missing.opf" media-type="application/oebps-package+xml"/></rootfiles>
           </container>"#,
    );

    let error = Epub::open(&archive).await.unwrap_err();
    assert!(matches!(error, EbookError::Archive(error) if error.is_not_found()));
}

#[tokio::test]
async fn test_structural_errors() {
    #[rustfmt::skip]
    let cases = [
        (r#"<itemref idref="c2"/>"#, r#"<itemref idref="c3"/>"#, EpubError::UnresolvedSpineReference("c3".to_owned())),
        (r#"<spine toc="ncx""#, r#"<spine toc="toc""#, EpubError::UnresolvedTocReference("toc".to_owned())),
        (r#"id="style""#, r#"id="c1""#, EpubError::DuplicateItemId("c1".to_owned())),
        (
            r#"fallback="cover""#,
            r#"fallback="missing""#,
            EpubError::UnresolvedFallbackReference { item: "figure".to_owned(), reference: "missing".to_owned() },
        ),
        (
            r#"media-type="image/png" properties="cover-image""#,
            r#"media-type="image/png" properties="cover-image" fallback="figure""#,
            EpubError::CyclicFallbackChain("cover".to_owned()),
        ),
        (r#"version="3.0""#, r#"version="x""#, EpubError::InvalidVersion("x".to_owned())),
    ];

    for (from, to, expected) in cases {
        let archive = with_package_edit(from, to);
        let error = Epub::open(&archive).await.unwrap_err();

        match error {
            EbookError::Format(FormatError::Epub(error)) => assert_eq!(expected, error),
            error => panic!("Unexpected error for `{to}`: {error}"),
        }
    }
}

#[tokio::test]
async fn test_unparsable_package() {
    let archive = with_package_edit("</manifest>", "</manifest></metadata>");

    assert!(matches!(
        Epub::open(&archive).await,
        Err(EbookError::Format(FormatError::Unparsable(_)))
    ));
}

#[test]
#[wasm_bindgen_test]
fn test_duplicate_item_id() {
    let items = vec![
        Item::new("c1", "EPUB/c1.xhtml"),
        Item::new("c1", "EPUB/c2.xhtml"),
    ];

    assert_eq!(
        Some(EpubError::DuplicateItemId("c1".to_owned())),
        Manifest::new(items).err()
    );
}
