//! The engine facade.
//!
//! Owns the buffer, its byte states and the annotation list. Shared state
//! (live suggestions, selection readings, the verification cache) sits
//! behind `Arc`s so verification jobs can outlive a single call.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::annotation::{Annotation, AnnotationRegistry};
use crate::clock::Clock;
use crate::codec::hex::parse_hex_buffer;
use crate::config::EngineConfig;
use crate::detect::{DetectorPipeline, ScanContext};
use crate::error::{Error, Result};
use crate::hexdump;
use crate::interpret::{Interpretation, InterpretationKind, interpret};
use crate::patterns::PatternDatabase;
use crate::rpc::{AccountInfo, RpcTransport};
use crate::state::ByteStateTracker;
use crate::suggestion::{BoardObserver, ByteRange, LiveBoard, Suggestion, SuggestionKey};
use crate::verify::{
    AccountFetcher, EndpointPool, Metrics, SelectionCheck, VerificationCache, VerificationJob,
    Verifier,
};

/// Readings for the current selection, plus the pending key check if the
/// selection is exactly one address wide.
pub struct Selection {
    pub readings: Vec<Interpretation>,
    pub check: Option<SelectionCheck>,
}

pub struct Engine {
    bytes: Vec<u8>,
    is_account_data: bool,
    loaded: bool,
    state: ByteStateTracker,
    annotations: AnnotationRegistry,
    pipeline: DetectorPipeline,
    board: Arc<LiveBoard>,
    verifier: Arc<Verifier>,
    fetcher: AccountFetcher,
    clock: Arc<dyn Clock>,
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        patterns: PatternDatabase,
        transport: Arc<dyn RpcTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = Arc::new(VerificationCache::new(config.cache_ttl, clock.clone()));
        Self::with_cache(config, patterns, transport, clock, cache)
    }

    /// Build an engine sharing an existing verification cache.
    pub fn with_cache(
        config: EngineConfig,
        patterns: PatternDatabase,
        transport: Arc<dyn RpcTransport>,
        clock: Arc<dyn Clock>,
        cache: Arc<VerificationCache>,
    ) -> Self {
        let pool = EndpointPool::from_config(&config, transport.clone());
        Self {
            bytes: Vec::new(),
            is_account_data: false,
            loaded: false,
            state: ByteStateTracker::default(),
            annotations: AnnotationRegistry::new(),
            pipeline: DetectorPipeline::new(patterns),
            board: Arc::new(LiveBoard::new()),
            verifier: Arc::new(Verifier::new(&config, transport, cache)),
            fetcher: AccountFetcher::new(pool),
            clock,
        }
    }

    pub fn subscribe(&self, observer: Arc<dyn BoardObserver>) {
        self.board.subscribe(observer);
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Load a hex string. Malformed input leaves the current buffer intact.
    pub fn load_hex(&mut self, input: &str) -> Result<()> {
        let bytes = parse_hex_buffer(input)?;
        self.load_bytes(bytes, false);
        Ok(())
    }

    /// Fetch an account and load its data as account data.
    pub async fn load_account(&mut self, address: &str) -> Result<AccountInfo> {
        let info = self.fetcher.fetch(address).await?;
        self.load_bytes(info.data.clone(), true);
        Ok(info)
    }

    /// Replace the buffer. In-flight results for the old buffer are dropped.
    pub fn load_bytes(&mut self, bytes: Vec<u8>, is_account_data: bool) {
        self.state.reset(bytes.len());
        self.annotations.clear();
        self.bytes = bytes;
        self.is_account_data = is_account_data;
        self.loaded = true;
        let generation = self.board.begin_generation();
        info!(
            "Loaded {} bytes{} (generation {})",
            self.bytes.len(),
            if is_account_data { " of account data" } else { "" },
            generation
        );
    }

    fn require_loaded(&self) -> Result<()> {
        if self.loaded {
            Ok(())
        } else {
            Err(Error::NoBufferLoaded)
        }
    }

    // ------------------------------------------------------------------
    // Detection
    // ------------------------------------------------------------------

    /// Run the synchronous detectors and return the verification job for
    /// the public-key candidates they found.
    ///
    /// Synchronous suggestions are on the board before this returns; the
    /// job adds verified keys when it runs.
    pub fn run_detectors(&mut self) -> Result<VerificationJob> {
        self.require_loaded()?;
        let ctx = ScanContext {
            bytes: &self.bytes,
            state: &self.state,
            is_account_data: self.is_account_data,
            now: self.clock.now(),
        };
        let output = self.pipeline.run(&ctx);

        let generation = self.board.generation();
        let found = output.suggestions.len();
        let added = self.board.merge(generation, output.suggestions);
        info!(
            "Detectors found {} suggestions ({} new), {} key candidates",
            found,
            added,
            output.candidates.len()
        );

        Ok(VerificationJob::new(
            generation,
            output.candidates,
            self.verifier.clone(),
            self.board.clone(),
        ))
    }

    /// Suggestions at or above the display threshold, best first.
    pub fn ranked_suggestions(&self) -> Vec<Suggestion> {
        self.board.ranked()
    }

    pub fn all_suggestions(&self) -> Vec<Suggestion> {
        self.board.all()
    }

    /// Suggestions eligible for one-click acceptance.
    pub fn max_confidence_suggestions(&self) -> Vec<Suggestion> {
        self.board.max_confidence()
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Toggle one byte in the staged selection.
    pub fn toggle_byte(&mut self, index: usize) -> Result<bool> {
        self.require_loaded()?;
        self.check_range(ByteRange::new(index, index + 1))?;
        Ok(self.state.toggle_staged(index))
    }

    /// Replace the staged selection with `range`.
    pub fn select(&mut self, range: ByteRange) -> Result<()> {
        self.require_loaded()?;
        self.check_range(range)?;
        if let Some(offset) = self.state.first_decoded(&range.as_range()) {
            return Err(Error::RangeConflict {
                start: range.start,
                end: range.end,
                offset,
            });
        }
        self.state.clear_staged();
        for index in range.as_range() {
            self.state.toggle_staged(index);
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.state.clear_staged();
        self.board.set_selection(self.board.generation(), Vec::new());
    }

    /// Interpret the staged bytes and publish the readings.
    pub fn interpret_selection(&self) -> Result<Selection> {
        self.require_loaded()?;
        let indices = self.state.staged_indices();
        let readings = interpret(&self.bytes, &indices, self.clock.now())?;
        debug!("{} readings for {} staged bytes", readings.len(), indices.len());

        let generation = self.board.generation();
        let check = readings
            .iter()
            .find(|r| r.kind == InterpretationKind::PublicKey)
            .map(|r| {
                SelectionCheck::new(
                    generation,
                    r.value.clone(),
                    r.range,
                    self.verifier.clone(),
                    self.board.clone(),
                )
            });

        self.board.set_selection(generation, readings.clone());
        Ok(Selection { readings, check })
    }

    pub fn selection_readings(&self) -> Vec<Interpretation> {
        self.board.selection()
    }

    // ------------------------------------------------------------------
    // Annotations
    // ------------------------------------------------------------------

    pub fn accept_suggestion(&mut self, key: &SuggestionKey, name: Option<&str>) -> Result<Annotation> {
        let suggestion = self
            .board
            .get(key)
            .ok_or_else(|| Error::SuggestionNotFound(format!("{} at {}", key.1, key.0)))?;

        let annotation = self
            .annotations
            .accept(
                &mut self.state,
                &suggestion.kind.to_string(),
                suggestion.range,
                &suggestion.value,
                name,
            )?
            .clone();

        self.board.mark_decoded(suggestion.range);
        Ok(annotation)
    }

    /// Accept the current selection reading of the given kind.
    pub fn accept_interpretation(
        &mut self,
        kind: InterpretationKind,
        name: Option<&str>,
    ) -> Result<Annotation> {
        let reading = self
            .board
            .selection()
            .into_iter()
            .find(|r| r.kind == kind)
            .ok_or_else(|| Error::InvalidSelection(format!("no {} reading for the selection", kind)))?;

        let annotation = self
            .annotations
            .accept(
                &mut self.state,
                &reading.kind.to_string(),
                reading.range,
                &reading.value,
                name,
            )?
            .clone();

        self.state.clear_staged();
        self.board.set_selection(self.board.generation(), Vec::new());
        self.board.mark_decoded(reading.range);
        Ok(annotation)
    }

    pub fn remove_annotation(&mut self, index: usize) -> Result<Annotation> {
        let annotation = self.annotations.remove(&mut self.state, index)?;
        self.board.release(annotation.range);
        Ok(annotation)
    }

    pub fn rename_annotation(&mut self, index: usize, name: &str) -> Result<()> {
        self.annotations.rename(index, name)
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.annotations.list()
    }

    pub fn annotations_json(&self) -> Result<String> {
        self.annotations.to_json()
    }

    pub fn export_annotations<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.annotations.export(path)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_account_data(&self) -> bool {
        self.is_account_data
    }

    pub fn state(&self) -> &ByteStateTracker {
        &self.state
    }

    pub fn board(&self) -> &Arc<LiveBoard> {
        &self.board
    }

    pub fn verifier(&self) -> &Arc<Verifier> {
        &self.verifier
    }

    pub fn metrics(&self) -> Metrics {
        self.verifier.metrics()
    }

    pub fn hexdump(&self, mask_decoded: bool) -> String {
        hexdump::render(&self.bytes, mask_decoded.then_some(&self.state))
    }

    fn check_range(&self, range: ByteRange) -> Result<()> {
        if range.is_empty() || range.end > self.bytes.len() {
            return Err(Error::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                len: self.bytes.len(),
            });
        }
        Ok(())
    }
}
