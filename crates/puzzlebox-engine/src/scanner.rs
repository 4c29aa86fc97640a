//! Sequential gate scanning over the shared token reader.
//!
//! All six gates share one reader, so only one gate may be active at a time.
//! A gate scan reinitializes the reader, then makes up to
//! [`MAX_SCAN_ATTEMPTS`] wake/select/release attempts. The first identity read
//! is resolved through the [`CategoryRegistry`]; a gate that yields nothing is
//! [`Category::Empty`].

use std::time::Duration;

use puzzlebox_core::constants::{
    DEFAULT_GATE_SETTLE_MS, DEFAULT_READER_STABILIZE_MS, DEFAULT_SCAN_RETRY_DELAY_MS,
    GATE_COUNT, MAX_SCAN_ATTEMPTS,
};
use puzzlebox_core::{Category, GateIndex, GateSnapshot, TokenIdentity};
use puzzlebox_hardware::{GateActuator, ReaderInfo, TokenReader};
use tracing::{debug, info, warn};

use crate::registry::CategoryRegistry;

/// Delays used while scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTiming {
    /// Pause after reinitializing the reader.
    pub reader_stabilize: Duration,

    /// Pause between failed read attempts.
    pub retry_delay: Duration,

    /// Pause after switching a gate relay.
    pub gate_settle: Duration,
}

impl Default for ScanTiming {
    fn default() -> Self {
        Self {
            reader_stabilize: Duration::from_millis(DEFAULT_READER_STABILIZE_MS),
            retry_delay: Duration::from_millis(DEFAULT_SCAN_RETRY_DELAY_MS),
            gate_settle: Duration::from_millis(DEFAULT_GATE_SETTLE_MS),
        }
    }
}

/// Scans gates one at a time and resolves what lies on them.
#[derive(Debug)]
pub struct GateScanner<R, G> {
    reader: R,
    gates: G,
    registry: CategoryRegistry,
    timing: ScanTiming,
    verbose: bool,
}

impl<R: TokenReader, G: GateActuator> GateScanner<R, G> {
    /// Create a scanner over a reader and relay bank.
    pub fn new(reader: R, gates: G, registry: CategoryRegistry) -> Self {
        Self {
            reader,
            gates,
            registry,
            timing: ScanTiming::default(),
            verbose: false,
        }
    }

    /// Override the scan delays.
    pub fn with_timing(mut self, timing: ScanTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Log per-gate results at `info` instead of `debug`.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Registry used to resolve identities.
    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    /// Scan delays in use.
    pub fn timing(&self) -> ScanTiming {
        self.timing
    }

    /// Scan every gate in physical order.
    ///
    /// All gates are driven inactive first so that no antenna other than the
    /// one being scanned is connected to the reader.
    pub async fn scan_all(&mut self) -> GateSnapshot {
        for gate in GateIndex::all() {
            self.drive(gate, false).await;
        }
        tokio::time::sleep(self.timing.gate_settle).await;

        let mut categories = [Category::Empty; GATE_COUNT];
        for gate in GateIndex::all() {
            categories[gate.as_usize()] = self.scan_gate(gate).await;
        }
        GateSnapshot::new(categories)
    }

    /// Scan one gate and resolve its category.
    ///
    /// The gate is active only for the duration of this call.
    pub async fn scan_gate(&mut self, gate: GateIndex) -> Category {
        self.drive(gate, true).await;
        tokio::time::sleep(self.timing.gate_settle).await;

        let identity = self.read_identity(gate).await;

        tokio::time::sleep(self.timing.gate_settle).await;
        self.drive(gate, false).await;

        let category = identity.map_or(Category::Empty, |id| self.registry.resolve(&id));
        match identity {
            Some(id) if self.verbose => {
                info!(%gate, identity = %id, %category, "gate scanned");
            }
            Some(id) => debug!(%gate, identity = %id, %category, "gate scanned"),
            None if self.verbose => info!(%gate, "no token detected"),
            None => debug!(%gate, "no token detected"),
        }
        category
    }

    async fn read_identity(&mut self, gate: GateIndex) -> Option<TokenIdentity> {
        if let Err(e) = self.reader.reinitialize().await {
            warn!(%gate, error = %e, "reader reinitialization failed");
        }
        tokio::time::sleep(self.timing.reader_stabilize).await;

        for attempt in 1..=MAX_SCAN_ATTEMPTS {
            match self.attempt_read().await {
                Ok(Some(identity)) => return Some(identity),
                Ok(None) => debug!(%gate, attempt, "read attempt found nothing"),
                Err(e) => warn!(%gate, attempt, error = %e, "read attempt failed"),
            }

            if attempt < MAX_SCAN_ATTEMPTS {
                tokio::time::sleep(self.timing.retry_delay).await;
            }
        }
        None
    }

    /// One wake → select → release cycle.
    async fn attempt_read(&mut self) -> puzzlebox_hardware::Result<Option<TokenIdentity>> {
        if !self.reader.wake().await? {
            return Ok(None);
        }
        let identity = self.reader.select_and_read_identity().await;
        if let Err(e) = self.reader.release_and_stop().await {
            warn!(error = %e, "token release failed");
        }
        identity
    }

    /// Identification reported by the token reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader cannot be queried.
    pub async fn reader_info(&self) -> puzzlebox_hardware::Result<ReaderInfo> {
        self.reader.reader_info().await
    }

    async fn drive(&mut self, gate: GateIndex, active: bool) {
        if let Err(e) = self.gates.set_gate_active(gate, active).await {
            warn!(%gate, active, error = %e, "gate relay failed");
        }
    }
}
