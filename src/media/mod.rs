//! Post media: which URLs a post references, and how they are packaged.

pub mod archive;
pub mod extract;

pub use archive::{MediaArchive, MediaArchiver, MediaFetchError};
pub use extract::{extract_media, MediaCollection};
