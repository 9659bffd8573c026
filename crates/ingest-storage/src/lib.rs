//! Ingest Storage Library
//!
//! This crate provides the storage-facing components of the relay:
//!
//! - the dedup store ([`DedupStore`]) with DynamoDB and in-memory backends,
//! - the source object fetcher ([`ObjectFetcher`]) that turns a bucket/key into
//!   a single-pass byte stream via a short-lived signed GET URL,
//! - the slot URL signer ([`WriteUrlSigner`]) that turns an upload slot's
//!   temporary credentials into a signed PUT URL.
//!
//! All network-facing components sit behind `async_trait` seams so the
//! pipeline can be exercised without AWS.

pub mod dedup;
pub mod factory;
pub mod object;
pub mod signer;

// Re-export commonly used types
#[cfg(feature = "dedup-dynamodb")]
pub use dedup::dynamo::{DynamoDedupConfig, DynamoDedupStore};
pub use dedup::memory::MemoryDedupStore;
pub use dedup::DedupStore;
pub use factory::create_dedup_store;
#[cfg(feature = "object-s3")]
pub use object::S3ObjectFetcher;
pub use object::{ByteStream, ObjectFetcher, SourceObject};
#[cfg(feature = "object-s3")]
pub use signer::SlotUrlSigner;
pub use signer::WriteUrlSigner;
