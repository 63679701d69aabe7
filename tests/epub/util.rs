use bindery::Epub;
use bindery::ebook::archive::{Archive, DirectoryArchive, MemoryArchive, ZipArchive};
use bindery::ebook::resource::{DecryptionContext, Decryptor, DecryptorError};
use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Arc;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const EXAMPLE_EPUB_DIR: &str = "tests/ebooks/example_epub";
pub const IDENTIFIER: &str = "urn:uuid:3f9a2c4e-7b1d-4e8a-9c2f-5d6e7a8b9c0d";

pub enum TestArchive {
    /// Unzipped example epub
    ///
    /// Mapped to: [`EXAMPLE_EPUB_DIR`]
    Directory,
    /// The example epub zipped in memory
    Zip,
}

impl TestArchive {
    pub fn archive(self) -> Arc<dyn Archive> {
        match self {
            Self::Directory => Arc::new(DirectoryArchive::new(EXAMPLE_EPUB_DIR).unwrap()),
            Self::Zip => Arc::new(ZipArchive::new(Cursor::new(zip_example_epub())).unwrap()),
        }
    }

    pub async fn open(self) -> (Arc<Epub>, Arc<dyn Archive>) {
        let archive = self.archive();
        let epub = Epub::open(archive.as_ref()).await.unwrap();
        (Arc::new(epub), archive)
    }
}

/// Every file of the example epub as `(container path, content)`,
/// with `mimetype` first.
pub fn example_entries() -> Vec<(String, Vec<u8>)> {
    let root = Path::new(EXAMPLE_EPUB_DIR);
    let mut entries = Vec::new();
    collect_files(root, root, &mut entries);

    entries.sort_by_key(|(path, _)| (path != "mimetype", path.clone()));
    entries
}

fn collect_files(root: &Path, dir: &Path, entries: &mut Vec<(String, Vec<u8>)>) {
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();

        if path.is_dir() {
            collect_files(root, &path, entries);
        } else {
            let relative = path.strip_prefix(root).unwrap();
            let key = relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            entries.push((key, std::fs::read(&path).unwrap()));
        }
    }
}

/// Zips the example epub, storing `mimetype` uncompressed.
pub fn zip_example_epub() -> Vec<u8> {
    zip_entries(example_entries())
}

pub fn zip_entries(entries: impl IntoIterator<Item = (String, Vec<u8>)>) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (path, content) in entries {
        let options = if path == "mimetype" { stored } else { deflated };
        zip.start_file(path, options).unwrap();
        zip.write_all(&content).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// The example epub held in memory.
pub fn memory_example_epub() -> MemoryArchive {
    example_entries().into_iter().collect()
}

pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// A stand-in cipher for tests: XORs every byte with a fixed key.
#[derive(Copy, Clone, Debug)]
pub struct XorCipher(pub u8);

impl XorCipher {
    pub fn apply(&self, data: &[u8]) -> Vec<u8> {
        data.iter().map(|byte| byte ^ self.0).collect()
    }
}

impl Decryptor for XorCipher {
    fn decrypt(&self, _: &DecryptionContext<'_>, data: Vec<u8>) -> Result<Vec<u8>, DecryptorError> {
        Ok(self.apply(&data))
    }

    fn decrypted_length(&self, _: &DecryptionContext<'_>, encrypted_length: u64) -> Option<u64> {
        Some(encrypted_length)
    }
}

/// A cipher that always fails.
#[derive(Copy, Clone, Debug)]
pub struct FailingCipher;

impl Decryptor for FailingCipher {
    fn decrypt(&self, _: &DecryptionContext<'_>, _: Vec<u8>) -> Result<Vec<u8>, DecryptorError> {
        Err("invalid padding".into())
    }
}

pub const CIPHER: XorCipher = XorCipher(0x5a);

/// The example epub in memory, with `c1.xhtml` encrypted by [`CIPHER`]
/// and `c2.xhtml` deflated, then encrypted.
pub fn encrypted_example_epub() -> MemoryArchive {
    let mut archive = memory_example_epub();
    let c1 = read_example_file("EPUB/c1.xhtml");
    let c2 = read_example_file("EPUB/c2.xhtml");
    let encryption = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
        <encryption xmlns="urn:oasis:names:tc:opendocument:xmlns:container"
                    xmlns:enc="http://www.w3.org/2001/04/xmlenc#"
                    xmlns:comp="http://www.idpf.org/2016/encryption#compression">
          <enc:EncryptedData>
            <enc:EncryptionMethod Algorithm="http://www.idpf.org/2008/embedding"/>
            <enc:CipherData><enc:CipherReference URI="EPUB/fonts/serif.otf"/></enc:CipherData>
          </enc:EncryptedData>
          <enc:EncryptedData>
            <enc:EncryptionMethod Algorithm="http://www.w3.org/2001/04/xmlenc#aes256-cbc"/>
            <enc:CipherData><enc:CipherReference URI="EPUB/c1.xhtml"/></enc:CipherData>
          </enc:EncryptedData>
          <enc:EncryptedData>
            <enc:EncryptionMethod Algorithm="http://www.w3.org/2001/04/xmlenc#aes256-cbc"/>
            <enc:CipherData><enc:CipherReference URI="EPUB/c2.xhtml"/></enc:CipherData>
            <enc:EncryptionProperties>
              <enc:EncryptionProperty>
                <comp:Compression Method="8" OriginalLength="{}"/>
              </enc:EncryptionProperty>
            </enc:EncryptionProperties>
          </enc:EncryptedData>
        </encryption>"#,
        c2.len()
    );

    archive.insert("META-INF/encryption.xml", encryption);
    archive.insert("EPUB/c1.xhtml", CIPHER.apply(&c1));
    archive.insert("EPUB/c2.xhtml", CIPHER.apply(&deflate(&c2)));
    archive
}

pub fn read_example_file(path: &str) -> Vec<u8> {
    std::fs::read(format!("{EXAMPLE_EPUB_DIR}/{path}")).unwrap()
}

/// The deobfuscated content of `EPUB/fonts/serif.otf`.
pub fn serif_font() -> Vec<u8> {
    (0..2048).map(|i| (i % 251) as u8).collect()
}
