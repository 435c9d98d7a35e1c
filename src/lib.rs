//! # logcache
//!
//! A persistent key-value cache with:
//! - An append-only record log and an in-memory offset index
//! - Index rebuild by replaying the log on open
//! - Synchronous compaction on removal
//! - A separate append-only metadata log keyed by the same keys
//! - Byte-oriented stores (in-memory or bucketed single file) for callers
//!   that prefer per-call encoders over typed stores
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 EntryCache<K, V, M>                          │
//! │        (Cache + MetadataCache, one data directory)           │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │                              │
//!                ▼                              ▼
//!        ┌──────────────┐               ┌──────────────┐
//!        │ LogStore<K,V>│               │MetadataStore │
//!        │ (compacting) │               │ (grow only)  │
//!        └──────┬───────┘               └──────┬───────┘
//!               │      codecs: K, V, M         │
//!               ▼                              ▼
//!        ┌──────────────┐               ┌──────────────┐
//!        │  cache.log   │               │ metadata.log │
//!        └──────────────┘               └──────────────┘
//!
//!   ComposableCache<S> ──▶ KeyValueStore ──▶ MemoryStore | BucketStore
//! ```
//!
//! All stores are safe to share across threads of one process. Nothing
//! coordinates separate processes opening the same files.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod entry;
pub mod log;
pub mod metadata;
pub mod cache;
pub mod kv;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CacheError, Result};
pub use config::{Config, SyncStrategy};
pub use entry::Entry;
pub use log::LogStore;
pub use metadata::MetadataStore;
pub use cache::{Cache, EntryCache, MetadataCache};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of logcache
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
