pub mod blob;

pub use blob::BlobStorage;
