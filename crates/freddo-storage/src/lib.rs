//! Freddo Storage crate - the recipe image collection.
//!
//! Provides the [`ImageStore`] seam used by the HTTP layer, a directory-backed
//! implementation for deployments and an in-memory one for tests.

pub mod error;
pub mod fs;
pub mod memory;
pub mod store;

pub use error::StorageError;
pub use fs::FsImageStore;
pub use memory::MemoryImageStore;
pub use store::{content_type_for, file_stem, is_png, validate_name, ImageStore};
