use crate::epub::util::{TestArchive, encrypted_example_epub, read_example_file};
use bindery::Epub;
use bindery::epub::encryption::{CompressionMethod, Encryption, EncryptionData, algorithms};
use wasm_bindgen_test::wasm_bindgen_test;

#[tokio::test]
async fn test_encryption_map() {
    let (epub, _) = TestArchive::Directory.open().await;
    let encryption = epub.encryption().unwrap();

    assert_eq!(1, encryption.len());

    let font = epub.encryption_for("/EPUB/fonts/serif.otf").unwrap();
    assert_eq!(algorithms::IDPF_OBFUSCATION, font.algorithm());
    assert!(font.is_obfuscation());
    assert!(font.compression().is_none());

    assert!(epub.encryption_for("EPUB/c1.xhtml").is_none());
}

#[tokio::test]
async fn test_encryption_with_compression() {
    let archive = encrypted_example_epub();
    let epub = Epub::open(&archive).await.unwrap();
    let c2_length = read_example_file("EPUB/c2.xhtml").len() as u64;

    assert_eq!(3, epub.encryption().unwrap().len());

    let c1 = epub.encryption_for("EPUB/c1.xhtml").unwrap();
    assert_eq!(algorithms::AES256_CBC, c1.algorithm());
    assert!(!c1.is_obfuscation());
    assert!(c1.compression().is_none());

    let compression = epub.encryption_for("EPUB/c2.xhtml").unwrap().compression().unwrap();
    assert_eq!("8", compression.method());
    assert_eq!(CompressionMethod::Deflated, compression.compression_method().unwrap());
    assert_eq!(Some(c2_length), compression.original_length());
}

#[test]
#[wasm_bindgen_test]
fn test_duplicate_entries() {
    let data = EncryptionData::from_entries([
        ("EPUB/c1.xhtml", Encryption::new(algorithms::IDPF_OBFUSCATION)),
        ("/EPUB/./c1.xhtml", Encryption::new(algorithms::AES256_CBC)),
    ]);

    // The last declaration wins
    assert_eq!(1, data.len());
    assert_eq!(algorithms::AES256_CBC, data.get("EPUB/c1.xhtml").unwrap().algorithm());
}
