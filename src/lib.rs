//! # bindery
//!
//! An asynchronous EPUB library: a typed model of the package document
//! and range-addressable access to publication resources.
//!
//! ## Overview
//! - [`Epub`]: The parsed package document, navigation and encryption map.
//! - [`Fetcher`]: Resolves [`Link`]s into [`Resource`] handles.
//! - [`Resource`]: Lazily reads, decrypts and decompresses content, in whole or by byte range.
//! - [`Archive`](ebook::archive::Archive): The storage an EPUB is read from
//!   (zip file, unzipped directory or memory).
//!
//! ## Examples
//! Opening an EPUB and reading part of a chapter:
//! ```
//! use bindery::ebook::archive::DirectoryArchive;
//! use bindery::{Epub, Fetcher};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let archive = Arc::new(DirectoryArchive::new("tests/ebooks/example_epub")?);
//! let epub = Arc::new(Epub::open(archive.as_ref()).await?);
//!
//! // Retrieving the title
//! println!("Title = {:?}", epub.package().metadata().title());
//!
//! // Reading the first bytes of each chapter in reading order
//! let fetcher = Fetcher::new(Arc::clone(&epub), archive);
//!
//! for item in epub.package().reading_order() {
//!     let resource = fetcher.get_item(item);
//!     let head = resource.read(Some(0..16)).await?;
//!
//!     println!("{}: {}", item.href(), String::from_utf8_lossy(&head));
//! }
//! # Ok(())
//! # }
//! ```

pub mod ebook;
mod parser;
mod util;

pub use self::ebook::epub::{self, Epub};
pub use self::ebook::link::Link;
pub use self::ebook::resource::{Fetcher, Resource};
