//! Core publication model and resource access.
//!
//! # Overview
//! ## Supported Formats
//! - [`epub`]: EPUB 2 and 3
//!
//! ## Core Components
//! - [`archive`]: Storage backends an ebook is read from.
//! - [`resource`]: Resolving links into readable resource handles.
//! - [`link`]: References to publication resources.
//! - [`errors`]: Ebook-related error types.
//!
//! ## Supporting Components
//! - [`named`]: Enumerations with a canonical textual form.

pub mod archive;
pub mod epub;
pub mod errors;
pub mod link;
pub mod named;
pub mod resource;
