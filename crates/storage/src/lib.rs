//! Snapshot persistence.
//!
//! - [`DurableStore`] over [`GithubContents`]: the production store, a single
//!   JSON file in a GitHub repository written with optimistic concurrency.
//! - [`LocalFileStore`]: a JSON file on local disk.

pub mod durable;
pub mod error;
pub mod github;
pub mod local;
pub mod store;

pub use durable::{DurableStore, RetryPolicy};
pub use error::StorageError;
pub use github::{GithubConfig, GithubContents};
pub use local::LocalFileStore;
pub use store::{ContentsBackend, RemoteFile, SnapshotStore};
