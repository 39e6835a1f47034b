//! crib — a client-side cheat-sheet content cache.
//!
//! The crate tracks a small catalog of named document categories, probes a
//! static host once to discover which categories actually have backing
//! content, lazily fetches each category's document on demand, and exposes
//! per-category read state (content, loading flag, error, freshness
//! timestamp) plus a single selection pointer to a presentation layer.
//!
//! # Architecture
//!
//! - [`Config`] - TOML-loadable configuration: resource base URL, document
//!   extension, and the static candidate category list
//! - `content` (internal) - the HTTP transport seam: availability probe and
//!   size-capped document fetch, with timeouts owned by this layer
//! - [`SheetStore`] - the cache/loader state machine; owns the discovered
//!   category list, the per-category record map, and the selection pointer
//!
//! All load failures are captured inside the affected [`SheetRecord`] rather
//! than surfaced as errors from the store's operations; consumers poll
//! [`SheetStore::has_error`] / [`SheetStore::error_message`] instead of
//! handling a `Result`.

mod config;
mod content;
mod store;

pub use config::{Config, ConfigError};
pub use content::ContentError;
pub use store::{Category, SheetRecord, SheetStore, SheetView};
