//! The cheat-sheet cache store: discovery, lazy loading, selection, and the
//! read-only views a presentation layer renders from.
//!
//! Every mutating operation takes `&mut self`, so loads are serialized by the
//! borrow checker; record mutations happen synchronously on either side of
//! the single transport await inside an operation. Probes run sequentially in
//! candidate order, one request in flight at a time.
//!
//! No operation here returns an error. Load failures are written into the
//! affected [`SheetRecord`] as an error message plus a placeholder document,
//! and consumers poll [`SheetStore::has_error`] / [`SheetStore::error_message`].
use crate::config::{Config, ConfigError};
use crate::content::{self, ContentError};
use chrono::Utc;
use std::collections::HashMap;

// ============================================================================
// Data Types
// ============================================================================

/// A discovered category: a named document the store can load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
}

/// Per-category cached state.
///
/// Created lazily on the first mutating touch (discovery probe or load
/// attempt), never deleted individually; only [`SheetStore::reset`] removes
/// records, and it removes all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRecord {
    /// Last successfully fetched body, or a synthesized placeholder document
    /// after a failed attempt. Empty until the first load attempt.
    pub content: String,

    /// True strictly while a fetch for this category is in flight.
    pub loading: bool,

    /// `None` when the last attempt succeeded or none was made; otherwise a
    /// human-readable description of the failure.
    pub error: Option<String>,

    /// Unix epoch milliseconds of the last successful fetch; 0 means never
    /// loaded. Not cleared by later failures, so a record can carry a fresh
    /// error alongside the timestamp of an earlier success.
    pub last_loaded: i64,

    /// Load counter for stale-result detection. Bumped when a load begins;
    /// a finishing load whose captured generation is no longer current is
    /// discarded instead of committed.
    generation: u64,
}

/// Snapshot view model assembled from the currently selected record.
///
/// All-default when nothing is selected or the selected category has no
/// record yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetView {
    pub selected_id: Option<String>,
    pub content: String,
    pub loading: bool,
    pub error: Option<String>,
    pub last_loaded: i64,
}

// ============================================================================
// Store
// ============================================================================

/// The cache/loader state machine.
///
/// Owns the HTTP client, the discovered category list (candidate order), the
/// per-category record map, and the single selection pointer. Constructed
/// explicitly and passed to consumers; there is no global instance.
pub struct SheetStore {
    config: Config,
    client: reqwest::Client,
    categories: Vec<Category>,
    selected: Option<String>,
    records: HashMap<String, SheetRecord>,
}

impl SheetStore {
    /// Creates a store over a validated configuration with a fresh HTTP
    /// client.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Creates a store with a caller-provided client (shared connection
    /// pools, test configuration).
    pub fn with_client(config: Config, client: reqwest::Client) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            client,
            categories: Vec::new(),
            selected: None,
            records: HashMap::new(),
        })
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Probes each configured candidate category for backing content and
    /// rebuilds the discovered list from scratch.
    ///
    /// Probes run sequentially in candidate order, and the discovered list
    /// preserves that order. A non-2xx probe simply leaves the candidate out;
    /// a probe that fails at the transport level additionally records a
    /// diagnostic error on the candidate's record. Neither aborts discovery.
    ///
    /// If discovery found anything and nothing is selected yet, the first
    /// discovered category is auto-selected, which triggers its content load.
    pub async fn discover_categories(&mut self) {
        let candidates = self.config.categories.clone();
        let mut discovered = Vec::new();

        for id in &candidates {
            self.get_or_create_record(id);

            match content::probe(&self.client, &self.config, id).await {
                Ok(true) => discovered.push(Category { id: id.clone() }),
                Ok(false) => {
                    tracing::debug!(category = %id, "Probe miss, category has no backing content");
                }
                Err(err) => {
                    tracing::warn!(category = %id, error = %err, "Availability probe failed");
                    let record = self.get_or_create_record(id);
                    record.error = Some(format!("Failed to check availability: {}", err));
                }
            }
        }

        tracing::info!(
            candidates = candidates.len(),
            discovered = discovered.len(),
            "Category discovery complete"
        );
        self.categories = discovered;

        if self.selected.is_none() {
            if let Some(first) = self.categories.first().map(|c| c.id.clone()) {
                self.select_category(&first).await;
            }
        }
    }

    /// Ensures a category's content is loaded, creating its record on demand.
    ///
    /// Without `force_reload`, a record that already holds content with no
    /// error is a cache hit: the call returns without contacting the host.
    /// A record in a failed state never short-circuits, so retrying a failed
    /// category always refetches.
    ///
    /// Failure is captured in the record, never returned: a non-2xx response
    /// writes a status-carrying error and a category-specific "not found"
    /// placeholder; a transport failure writes the failure detail and a
    /// generic placeholder. The loading flag is cleared on every path.
    pub async fn load_content(&mut self, category_id: &str, force_reload: bool) {
        {
            let record = self.get_or_create_record(category_id);
            if !force_reload && !record.content.is_empty() && record.error.is_none() {
                tracing::debug!(category = %category_id, "Cache hit, skipping fetch");
                return;
            }
        }

        let generation = self.begin_load(category_id);
        let result = content::fetch_document(&self.client, &self.config, category_id).await;
        self.finish_load(category_id, generation, result);
    }

    /// Sets the selection pointer and ensures the selected category's content
    /// is loaded (cache permitting).
    ///
    /// Selection is unvalidated: an id outside the discovered list is
    /// allowed, and the triggered load lazily creates its record.
    pub async fn select_category(&mut self, category_id: &str) {
        self.selected = Some(category_id.to_string());
        self.load_content(category_id, false).await;
    }

    /// Force-reloads the selected category's content. No-op when nothing is
    /// selected.
    pub async fn refresh_current(&mut self) {
        let Some(id) = self.selected.clone() else {
            return;
        };
        self.load_content(&id, true).await;
    }

    /// Wipes everything: discovered list, selection, and every record.
    pub fn reset(&mut self) {
        self.categories.clear();
        self.selected = None;
        self.records.clear();
    }

    // ------------------------------------------------------------------
    // Load phases
    // ------------------------------------------------------------------

    fn get_or_create_record(&mut self, category_id: &str) -> &mut SheetRecord {
        self.records
            .entry(category_id.to_string())
            .or_default()
    }

    /// Marks a load as started and returns the generation the finishing phase
    /// must present to commit its result.
    fn begin_load(&mut self, category_id: &str) -> u64 {
        let record = self.get_or_create_record(category_id);
        record.loading = true;
        record.error = None;
        record.generation += 1;
        record.generation
    }

    /// Commits a load result into the record, unless the record was wiped or
    /// a newer load has started since (stale result, discarded).
    fn finish_load(
        &mut self,
        category_id: &str,
        generation: u64,
        result: Result<String, ContentError>,
    ) {
        let Some(record) = self.records.get_mut(category_id) else {
            tracing::debug!(category = %category_id, "Discarding load result for wiped record");
            return;
        };
        if record.generation != generation {
            tracing::debug!(category = %category_id, "Discarding stale load result");
            return;
        }

        match result {
            Ok(body) => {
                record.content = body;
                record.last_loaded = Utc::now().timestamp_millis();
                record.error = None;
            }
            Err(ContentError::HttpStatus(status)) => {
                tracing::warn!(category = %category_id, status, "Content not found");
                record.error = Some(format!("Content not found ({})", status));
                record.content = content::not_found_placeholder(category_id);
            }
            Err(err) => {
                tracing::warn!(category = %category_id, error = %err, "Content fetch failed");
                record.error = Some(format!("Failed to load content: {}", err));
                record.content = content::failure_placeholder(category_id);
            }
        }
        record.loading = false;
    }

    // ------------------------------------------------------------------
    // Read-only views
    // ------------------------------------------------------------------
    // Pure functions of current state. None of these creates a record.

    /// The discovered categories, in candidate order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// The selected category id, if any.
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The discovered-list entry matching the selection. `None` when nothing
    /// is selected or the selected id was never discovered.
    pub fn selected_category(&self) -> Option<&Category> {
        let selected = self.selected.as_deref()?;
        self.categories.iter().find(|c| c.id == selected)
    }

    /// The record for the selected category, if both exist.
    pub fn current_record(&self) -> Option<&SheetRecord> {
        self.records.get(self.selected.as_deref()?)
    }

    /// The record for an arbitrary category id, if one exists.
    pub fn record(&self, category_id: &str) -> Option<&SheetRecord> {
        self.records.get(category_id)
    }

    /// Whether the selected category's load is in flight. False when nothing
    /// is selected.
    pub fn is_loading(&self) -> bool {
        self.current_record().is_some_and(|r| r.loading)
    }

    /// The selected category's content, `""` when nothing is selected.
    pub fn current_content(&self) -> &str {
        self.current_record().map_or("", |r| r.content.as_str())
    }

    /// Whether the selected category's record carries an error. False when
    /// there is no current record at all.
    pub fn has_error(&self) -> bool {
        self.current_record().is_some_and(|r| r.error.is_some())
    }

    /// The selected category's error message, `""` when absent.
    pub fn error_message(&self) -> &str {
        self.current_record()
            .and_then(|r| r.error.as_deref())
            .unwrap_or("")
    }

    /// Assembles the full view model for the current selection.
    pub fn view(&self) -> SheetView {
        let selected_id = self.selected.clone();
        match self.current_record() {
            Some(record) => SheetView {
                selected_id,
                content: record.content.clone(),
                loading: record.loading,
                error: record.error.clone(),
                last_loaded: record.last_loaded,
            },
            None => SheetView {
                selected_id,
                ..SheetView::default()
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
