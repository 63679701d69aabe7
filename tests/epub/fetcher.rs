use crate::epub::util::{
    CIPHER, FailingCipher, TestArchive, encrypted_example_epub, memory_example_epub,
    read_example_file, serif_font,
};
use async_trait::async_trait;
use bindery::ebook::archive::errors::ArchiveResult;
use bindery::ebook::archive::{Archive, ArchiveAccess, MemoryArchive};
use bindery::ebook::resource::FetcherOptions;
use bindery::ebook::resource::errors::{DecodingStage, ResourceError};
use bindery::epub::encryption::algorithms;
use bindery::{Epub, Fetcher, Link};
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

async fn example_fetcher(archive: TestArchive) -> Fetcher {
    let (epub, archive) = archive.open().await;
    Fetcher::new(epub, archive)
}

async fn encrypted_fetcher(options: FetcherOptions) -> Fetcher {
    let archive = Arc::new(encrypted_example_epub());
    let epub = Arc::new(Epub::open(archive.as_ref()).await.unwrap());

    Fetcher::with_options(epub, archive, options)
}

#[tokio::test]
async fn test_read_resources() {
    for archive in [TestArchive::Directory, TestArchive::Zip] {
        let fetcher = example_fetcher(archive).await;
        let manifest = fetcher.epub().package().manifest();

        for item in manifest.items() {
            let resource = fetcher.get_item(item);
            let content = resource.read(None).await.unwrap();

            assert_eq!(item.href(), resource.link().href());
            assert_eq!(item.media_type(), resource.link().media_type());
            assert_eq!(content.len() as u64, resource.length().await.unwrap());

            // Fonts are deobfuscated; everything else is returned as stored
            if resource.is_encrypted() {
                assert_eq!(serif_font(), content);
            } else {
                assert_eq!(read_example_file(item.href()), content);
            }
        }
    }
}

#[tokio::test]
async fn test_get() {
    let fetcher = example_fetcher(TestArchive::Directory).await;

    let resource = fetcher.get("/EPUB/images/../c1.xhtml?v=2#start");
    assert_eq!("EPUB/c1.xhtml", resource.link().href());
    assert_eq!(Some("application/xhtml+xml"), resource.link().media_type());
    assert!(!resource.is_encrypted());

    // Caller-provided details are kept
    let link = Link::new("EPUB/c2.xhtml")
        .with_title("Chapter 2")
        .with_media_type("text/html");
    let resource = fetcher.get(&link);
    assert_eq!(Some("Chapter 2"), resource.link().title());
    assert_eq!(Some("text/html"), resource.link().media_type());

    let resource = fetcher.get("EPUB/fonts/serif.otf");
    assert!(resource.is_encrypted());
    assert!(resource.link().encryption().unwrap().is_obfuscation());
}

#[tokio::test]
async fn test_get_unlisted_resource() {
    let fetcher = example_fetcher(TestArchive::Zip).await;

    // Not in the manifest, although present in the archive
    let container = fetcher.get("META-INF/container.xml");
    assert_eq!(Some("application/xml"), container.link().media_type());
    assert_eq!(
        read_example_file("META-INF/container.xml"),
        container.read(None).await.unwrap()
    );

    let missing = fetcher.get("EPUB/missing.xhtml");
    assert_eq!(Some("application/xhtml+xml"), missing.link().media_type());
    assert!(matches!(
        missing.read(None).await,
        Err(ResourceError::ResourceNotFound(href)) if href == "EPUB/missing.xhtml"
    ));
    assert!(matches!(
        missing.length().await,
        Err(ResourceError::ResourceNotFound(_))
    ));
    assert!(matches!(
        missing.read(Some(0..10)).await,
        Err(ResourceError::ResourceNotFound(_))
    ));
}

#[tokio::test]
async fn test_infer_media_types_disabled() {
    let (epub, archive) = TestArchive::Directory.open().await;
    let fetcher = Fetcher::with_options(
        epub,
        archive,
        FetcherOptions::builder().infer_media_types(false),
    );

    assert_eq!(None, fetcher.get("META-INF/container.xml").link().media_type());
    assert_eq!(Some("text/css"), fetcher.get("EPUB/style.css").link().media_type());
}

#[tokio::test]
async fn test_read_range() {
    for archive in [TestArchive::Directory, TestArchive::Zip] {
        let fetcher = example_fetcher(archive).await;
        let resource = fetcher.get("EPUB/c1.xhtml");
        let content = read_example_file("EPUB/c1.xhtml");
        let length = content.len() as u64;

        assert_eq!(content[..38], resource.read(Some(0..38)).await.unwrap());
        assert_eq!(content[100..120], resource.read(Some(100..120)).await.unwrap());
        assert!(resource.read(Some(10..10)).await.unwrap().is_empty());

        // The end is clamped to the length
        assert_eq!(content[400..], resource.read(Some(400..10_000)).await.unwrap());
        assert!(resource.read(Some(length..length + 5)).await.unwrap().is_empty());

        let error = resource.read(Some(length + 1..length + 5)).await.unwrap_err();
        assert!(matches!(
            error,
            ResourceError::RangeNotSatisfiable { length: Some(actual), .. } if actual == length
        ));
    }
}

#[tokio::test]
#[allow(clippy::reversed_empty_ranges)]
async fn test_read_inverted_range() {
    let fetcher = example_fetcher(TestArchive::Directory).await;

    assert!(matches!(
        fetcher.get("EPUB/c1.xhtml").read(Some(20..10)).await,
        Err(ResourceError::RangeNotSatisfiable { range, .. }) if range == (20..10)
    ));
}

#[tokio::test]
async fn test_deobfuscation() {
    let fetcher = example_fetcher(TestArchive::Zip).await;
    let font = fetcher.get("EPUB/fonts/serif.otf");
    let expected = serif_font();

    assert_eq!(expected.len() as u64, font.length().await.unwrap());
    assert_eq!(expected, font.read(None).await.unwrap());
    // A range spanning the end of the obfuscated prefix
    assert_eq!(expected[1030..1050], font.read(Some(1030..1050)).await.unwrap());
    assert!(matches!(
        font.read(Some(4096..4097)).await,
        Err(ResourceError::RangeNotSatisfiable { length: Some(2048), .. })
    ));
}

#[tokio::test]
async fn test_deobfuscation_disabled() {
    let (epub, archive) = TestArchive::Directory.open().await;
    let fetcher = Fetcher::with_options(
        epub,
        archive,
        FetcherOptions::builder().deobfuscate_fonts(false),
    );

    assert!(matches!(
        fetcher.get("EPUB/fonts/serif.otf").read(None).await,
        Err(ResourceError::DecodingFailed { stage: DecodingStage::Decryption, .. })
    ));
}

#[tokio::test]
async fn test_decryption() {
    let fetcher = encrypted_fetcher(
        FetcherOptions::builder()
            .decryptor(algorithms::AES256_CBC, CIPHER)
            .build(),
    )
    .await;
    let c1 = read_example_file("EPUB/c1.xhtml");
    let resource = fetcher.get("EPUB/c1.xhtml");

    assert!(resource.is_encrypted());
    assert_eq!(c1.len() as u64, resource.length().await.unwrap());
    assert_eq!(c1, resource.read(None).await.unwrap());
    assert_eq!(c1[5..25], resource.read(Some(5..25)).await.unwrap());

    // Unencrypted resources are unaffected
    let cover = fetcher.get("EPUB/images/cover.png");
    assert!(!cover.is_encrypted());
    assert_eq!(read_example_file("EPUB/images/cover.png"), cover.read(None).await.unwrap());
}

#[tokio::test]
async fn test_decryption_with_decompression() {
    let fetcher = encrypted_fetcher(
        FetcherOptions::builder()
            .decryptor(algorithms::AES256_CBC, CIPHER)
            .build(),
    )
    .await;
    let c2 = read_example_file("EPUB/c2.xhtml");
    let resource = fetcher.get("EPUB/c2.xhtml");

    // The declared original length
    assert_eq!(c2.len() as u64, resource.length().await.unwrap());
    assert_eq!(c2, resource.read(None).await.unwrap());
    assert_eq!(c2[c2.len() - 10..], resource.read(Some(c2.len() as u64 - 10..u64::MAX)).await.unwrap());
}

#[tokio::test]
async fn test_decryption_failures() {
    // No decryptor registered for the algorithm
    let fetcher = encrypted_fetcher(FetcherOptions::default()).await;
    let error = fetcher.get("EPUB/c1.xhtml").read(None).await.unwrap_err();

    assert!(matches!(
        error,
        ResourceError::DecodingFailed { ref href, stage: DecodingStage::Decryption, .. } if href == "EPUB/c1.xhtml"
    ));

    // The decryptor rejects the content
    let fetcher = encrypted_fetcher(
        FetcherOptions::builder()
            .decryptor(algorithms::AES256_CBC, FailingCipher)
            .build(),
    )
    .await;

    for href in ["EPUB/c1.xhtml", "EPUB/c2.xhtml"] {
        assert!(matches!(
            fetcher.get(href).read(Some(0..10)).await,
            Err(ResourceError::DecodingFailed { stage: DecodingStage::Decryption, .. })
        ));
    }
    // The declared length needs no decoding
    assert!(fetcher.get("EPUB/c2.xhtml").length().await.is_ok());
    // Otherwise, the failing decryptor is consulted
    assert!(fetcher.get("EPUB/c1.xhtml").length().await.is_err());

    // Other resources remain readable
    assert!(fetcher.get("EPUB/style.css").read(None).await.is_ok());
}

#[tokio::test]
async fn test_decompression_failure() {
    let mut archive = encrypted_example_epub();
    archive.insert("EPUB/c2.xhtml", CIPHER.apply(b"\xff\xff not deflated"));
    let archive = Arc::new(archive);
    let epub = Arc::new(Epub::open(archive.as_ref()).await.unwrap());
    let fetcher = Fetcher::with_options(
        epub,
        archive,
        FetcherOptions::builder().decryptor(algorithms::AES256_CBC, CIPHER),
    );

    assert!(matches!(
        fetcher.get("EPUB/c2.xhtml").read(None).await,
        Err(ResourceError::DecodingFailed { stage: DecodingStage::Decompression, .. })
    ));
}

/// The example epub with two extra chapters whose file names hold reserved characters:
/// `c#1.xhtml`, encrypted by [`CIPHER`], and `100%.xhtml`, stored as is.
async fn reserved_character_fetcher() -> Fetcher {
    let opf = String::from_utf8(read_example_file("EPUB/example.opf")).unwrap();
    let mut archive = memory_example_epub();

    archive.insert(
        "EPUB/example.opf",
        opf.replace(
            "</manifest>",
            r#"<item id="c3" href="c%231.xhtml" media-type="application/xhtml+xml"/>
               <item id="c4" href="100%25.xhtml" media-type="application/xhtml+xml"/>
             </manifest>"#,
        ),
    );
    archive.insert(
        "META-INF/encryption.xml",
        r#"<encryption xmlns="urn:oasis:names:tc:opendocument:xmlns:container"
                       xmlns:enc="http://www.w3.org/2001/04/xmlenc#">
             <enc:EncryptedData>
               <enc:EncryptionMethod Algorithm="http://www.w3.org/2001/04/xmlenc#aes256-cbc"/>
               <enc:CipherData><enc:CipherReference URI="EPUB/c%231.xhtml"/></enc:CipherData>
             </enc:EncryptedData>
           </encryption>"#,
    );
    archive.insert("EPUB/c#1.xhtml", CIPHER.apply(b"hello"));
    archive.insert("EPUB/100%.xhtml", "full");

    let archive = Arc::new(archive);
    let epub = Arc::new(Epub::open(archive.as_ref()).await.unwrap());

    Fetcher::with_options(
        epub,
        archive,
        FetcherOptions::builder().decryptor(algorithms::AES256_CBC, CIPHER),
    )
}

#[tokio::test]
async fn test_reserved_character_hrefs() {
    let fetcher = reserved_character_fetcher().await;
    let manifest = fetcher.epub().package().manifest();

    assert_eq!("EPUB/c#1.xhtml", manifest.by_id("c3").unwrap().href());
    assert_eq!("EPUB/100%.xhtml", manifest.by_id("c4").unwrap().href());
    assert_eq!(Some("c3"), manifest.by_href("EPUB/c%231.xhtml").map(|item| item.id()));
    assert_eq!(Some("c4"), manifest.by_href("EPUB/100%25.xhtml").map(|item| item.id()));

    // Encoded hrefs, as written in markup
    let encrypted = fetcher.get("EPUB/c%231.xhtml#start");
    assert_eq!("EPUB/c#1.xhtml", encrypted.link().href());
    assert_eq!(Some("application/xhtml+xml"), encrypted.link().media_type());
    assert!(encrypted.is_encrypted());
    assert_eq!(b"hello".to_vec(), encrypted.read(None).await.unwrap());
    assert_eq!(5, encrypted.length().await.unwrap());

    let stored = fetcher.get("EPUB/100%25.xhtml");
    assert_eq!("EPUB/100%.xhtml", stored.link().href());
    assert!(!stored.is_encrypted());
    assert_eq!(b"full".to_vec(), stored.read(None).await.unwrap());

    // Manifest items, whose hrefs are already decoded
    for (id, expected) in [("c3", b"hello".to_vec()), ("c4", b"full".to_vec())] {
        let resource = fetcher.get_item(manifest.by_id(id).unwrap());

        assert_eq!(id == "c3", resource.is_encrypted());
        assert_eq!(expected, resource.read(None).await.unwrap());
    }
}

#[tokio::test]
async fn test_length_of_missing_encrypted_entry() {
    let epub = Arc::new(Epub::open(&encrypted_example_epub()).await.unwrap());
    let fetcher = Fetcher::with_options(
        epub,
        Arc::new(MemoryArchive::new()),
        FetcherOptions::builder().decryptor(algorithms::AES256_CBC, CIPHER),
    );

    // `c2.xhtml` declares its original length, `c1.xhtml` relies on the decryptor
    for href in ["EPUB/c2.xhtml", "EPUB/c1.xhtml", "EPUB/fonts/serif.otf"] {
        let resource = fetcher.get(href);
        assert!(resource.is_encrypted());

        assert!(matches!(
            resource.length().await,
            Err(ResourceError::ResourceNotFound(missing)) if missing == href
        ));
        assert!(matches!(
            resource.read(None).await,
            Err(ResourceError::ResourceNotFound(_))
        ));
    }
}

/// Wraps a [`MemoryArchive`], recording the peak number of in-flight calls.
struct TrackingArchive {
    inner: MemoryArchive,
    access: ArchiveAccess,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl TrackingArchive {
    fn new(inner: MemoryArchive, access: ArchiveAccess) -> Self {
        Self {
            inner,
            access,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    async fn track<T>(&self, path: &str, call: impl Future<Output = T>) -> T {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);

        if path.ends_with("blocked.xhtml") {
            std::future::pending::<()>().await;
        }
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        let result = call.await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[async_trait]
impl Archive for TrackingArchive {
    fn access(&self) -> ArchiveAccess {
        self.access
    }

    async fn length(&self, path: &str) -> ArchiveResult<Option<u64>> {
        self.track(path, self.inner.length(path)).await
    }

    async fn read(&self, path: &str) -> ArchiveResult<Vec<u8>> {
        self.track(path, self.inner.read(path)).await
    }

    async fn read_range(&self, path: &str, range: Range<u64>) -> ArchiveResult<Vec<u8>> {
        self.track(path, self.inner.read_range(path, range)).await
    }
}

async fn tracking_fetcher(access: ArchiveAccess) -> (Fetcher, Arc<TrackingArchive>) {
    let archive = Arc::new(TrackingArchive::new(memory_example_epub(), access));
    let epub = Arc::new(Epub::open(archive.as_ref()).await.unwrap());

    (Fetcher::new(epub, archive.clone()), archive)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_serial_access() {
    let (fetcher, archive) = tracking_fetcher(ArchiveAccess::Serial).await;
    archive.peak.store(0, Ordering::SeqCst);

    let mut tasks = Vec::new();
    for index in 0..16 {
        let href = if index % 2 == 0 { "EPUB/c1.xhtml" } else { "EPUB/c2.xhtml" };
        let resource = fetcher.get(href);

        tasks.push(tokio::spawn(async move {
            let content = resource.read(Some(0..64)).await.unwrap();
            let length = resource.length().await.unwrap();
            (content.len(), length)
        }));
    }
    for task in tasks {
        let (read, length) = task.await.unwrap();
        assert_eq!(64, read);
        assert!(length > 64);
    }

    assert_eq!(1, archive.peak.load(Ordering::SeqCst));
    assert_eq!(0, archive.in_flight.load(Ordering::SeqCst));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_access() {
    let (fetcher, archive) = tracking_fetcher(ArchiveAccess::Concurrent).await;

    let tasks = (0..16)
        .map(|_| {
            let resource = fetcher.get("EPUB/style.css");
            tokio::spawn(async move { resource.read(None).await.unwrap() })
        })
        .collect::<Vec<_>>();

    for task in tasks {
        assert_eq!(read_example_file("EPUB/style.css"), task.await.unwrap());
    }
    assert_eq!(0, archive.in_flight.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_cancelled_read_releases_gate() {
    let mut inner = memory_example_epub();
    inner.insert("EPUB/blocked.xhtml", "<html/>");
    let archive = Arc::new(TrackingArchive::new(inner, ArchiveAccess::Serial));
    let epub = Arc::new(Epub::open(archive.as_ref()).await.unwrap());
    let fetcher = Fetcher::new(epub, archive);

    let blocked = fetcher.get("EPUB/blocked.xhtml");
    tokio::select! {
        biased;
        _ = blocked.read(None) => panic!("The blocked read must never complete"),
        _ = tokio::task::yield_now() => {}
    }

    // The pending read was dropped, so the gate is free again
    let content = fetcher.get("EPUB/style.css").read(None).await.unwrap();
    assert_eq!(read_example_file("EPUB/style.css"), content);
}
