//! Debounced fan-out over the remote nutrition providers.
//!
//! Each keystroke supersedes the previous search cycle. Cycles are
//! numbered; a response carrying a stale cycle id is discarded at
//! resolution time, so a slow old response can never overwrite a newer
//! fast one. Cancellation of in-flight requests is best-effort only;
//! the cycle check is the correctness mechanism.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::provider::{BarcodeOutcome, NutritionProvider, ProviderError};
use crate::models::RemoteFoodRecord;

#[derive(Debug, Clone, Copy)]
pub struct GatewayConfig {
    /// Quiet period after the last keystroke before a cycle fires.
    pub debounce: Duration,
    /// Minimum trimmed query length that triggers remote lookup;
    /// shorter input clears any prior remote results.
    pub min_query_len: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            min_query_len: 3,
        }
    }
}

/// One provider's slice of the current cycle.
#[derive(Debug, Clone, Default)]
pub struct ProviderState {
    pub name: String,
    pub loading: bool,
    /// True once this provider has answered (or failed) for the
    /// current cycle.
    pub searched: bool,
    pub failed: bool,
    pub results: Vec<RemoteFoodRecord>,
}

impl ProviderState {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    fn clear(&mut self) {
        self.loading = false;
        self.searched = false;
        self.failed = false;
        self.results.clear();
    }
}

/// Observable state of the current search cycle.
#[derive(Debug, Clone, Default)]
pub struct SearchSnapshot {
    pub query: String,
    pub providers: Vec<ProviderState>,
    /// At most one user-visible error per cycle, from the provider
    /// configured to report.
    pub error_notice: Option<String>,
}

struct GatewayState {
    cycle: u64,
    query: String,
    providers: Vec<ProviderState>,
    error_notice: Option<String>,
}

/// Resolves free-text queries against both providers in parallel, and
/// barcodes against the provider that supports them.
#[derive(Clone)]
pub struct RemoteFoodGateway {
    providers: Arc<Vec<Arc<dyn NutritionProvider>>>,
    config: GatewayConfig,
    state: Arc<Mutex<GatewayState>>,
}

impl RemoteFoodGateway {
    pub fn new(providers: Vec<Arc<dyn NutritionProvider>>, config: GatewayConfig) -> Self {
        let states = providers
            .iter()
            .map(|p| ProviderState::named(&p.config().name))
            .collect();
        Self {
            providers: Arc::new(providers),
            config,
            state: Arc::new(Mutex::new(GatewayState {
                cycle: 0,
                query: String::new(),
                providers: states,
                error_notice: None,
            })),
        }
    }

    /// Feeds one keystroke's worth of input. Every call supersedes the
    /// pending cycle; queries shorter than the trigger length clear
    /// remote results instead of searching.
    pub async fn handle_input(&self, raw: &str) {
        let query = raw.trim().to_string();
        let cycle;
        {
            let mut state = self.state.lock().await;
            state.cycle += 1;
            cycle = state.cycle;

            if query.chars().count() < self.config.min_query_len {
                state.query.clear();
                state.error_notice = None;
                for provider in &mut state.providers {
                    provider.clear();
                }
                return;
            }
            state.query = query.clone();
        }

        let gateway = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(gateway.config.debounce).await;
            {
                let state = gateway.state.lock().await;
                // A timer whose cycle has been superseded is a no-op.
                if state.cycle != cycle {
                    debug!(cycle, "debounce timer superseded");
                    return;
                }
            }
            gateway.begin_cycle(cycle).await;
            gateway.fan_out(cycle, &query).await;
        });
    }

    /// Runs one search cycle immediately, skipping the debounce
    /// window. Same trigger rule and isolation semantics.
    pub async fn search_now(&self, raw: &str) -> SearchSnapshot {
        let query = raw.trim().to_string();
        let cycle;
        {
            let mut state = self.state.lock().await;
            state.cycle += 1;
            cycle = state.cycle;

            if query.chars().count() < self.config.min_query_len {
                state.query.clear();
                state.error_notice = None;
                for provider in &mut state.providers {
                    provider.clear();
                }
                return Self::snapshot_of(&state);
            }
            state.query = query.clone();
        }

        self.begin_cycle(cycle).await;
        self.fan_out(cycle, &query).await;
        self.snapshot().await
    }

    /// Immediate, non-debounced lookup against the barcode-capable
    /// provider. A miss is `NotFound`, distinct from a failure.
    pub async fn barcode_lookup(&self, code: &str) -> Result<BarcodeOutcome, ProviderError> {
        let Some(provider) = self
            .providers
            .iter()
            .find(|p| p.config().supports_barcode)
        else {
            warn!("no provider supports barcode lookup");
            return Ok(BarcodeOutcome::NotFound);
        };

        match provider.barcode(code).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!(provider = %provider.config().name, error = %e, "barcode lookup failed");
                Err(e)
            }
        }
    }

    pub async fn snapshot(&self) -> SearchSnapshot {
        let state = self.state.lock().await;
        Self::snapshot_of(&state)
    }

    fn snapshot_of(state: &GatewayState) -> SearchSnapshot {
        SearchSnapshot {
            query: state.query.clone(),
            providers: state.providers.clone(),
            error_notice: state.error_notice.clone(),
        }
    }

    /// Marks every provider loading for a fresh cycle.
    async fn begin_cycle(&self, cycle: u64) {
        let mut state = self.state.lock().await;
        if state.cycle != cycle {
            return;
        }
        state.error_notice = None;
        for provider in &mut state.providers {
            provider.clear();
            provider.loading = true;
        }
    }

    /// Queries every provider in parallel. Each response is written
    /// back independently, and only if its cycle is still current.
    async fn fan_out(&self, cycle: u64, query: &str) {
        let lookups = self.providers.iter().enumerate().map(|(index, provider)| {
            let provider = Arc::clone(provider);
            let state = Arc::clone(&self.state);
            let query = query.to_string();
            async move {
                let result = provider.search(&query).await;

                let mut state = state.lock().await;
                if state.cycle != cycle {
                    debug!(provider = %provider.config().name, cycle, "discarding stale response");
                    return;
                }

                let slot = &mut state.providers[index];
                slot.loading = false;
                slot.searched = true;
                match result {
                    Ok(results) => {
                        slot.failed = false;
                        slot.results = results;
                    }
                    Err(e) => {
                        slot.failed = true;
                        slot.results.clear();
                        warn!(provider = %provider.config().name, error = %e, "provider search failed");
                        if provider.config().report_errors && state.error_notice.is_none() {
                            state.error_notice =
                                Some(format!("Food search failed ({})", provider.config().name));
                        }
                    }
                }
            }
        });

        join_all(lookups).await;
    }
}
