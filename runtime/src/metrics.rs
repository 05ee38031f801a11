//! Store metrics
//!
//! The store always records through the `metrics` facade; the numbers go
//! nowhere until a recorder is installed. [`PrometheusRecorder::install`]
//! installs one and describes what the store emits:
//!
//! | name | kind | meaning |
//! |------|------|---------|
//! | `store.actions.total` | counter | actions reduced, feedback included |
//! | `store.reducer.duration_seconds` | histogram | time inside `reduce` |
//! | `store.effects.count` | histogram | effects returned per action |
//! | `store.effects.executed{type}` | counter | effects started, per variant |
//! | `store.effects.cancelled` | counter | tasks aborted by `Effect::Cancel` |
//! | `store.shutdown.*` | counter | shutdown outcomes and rejected sends |
//!
//! ```rust,no_run
//! use reducer_kit_runtime::metrics::PrometheusRecorder;
//!
//! # fn example() -> Result<(), reducer_kit_runtime::metrics::MetricsError> {
//! let recorder = PrometheusRecorder::install()?;
//! if let Some(scrape) = recorder.render() {
//!     println!("{scrape}");
//! }
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

/// Reducer timings are expected in the microsecond range
const DURATION_BUCKETS: &[f64] = &[
    0.000_005, 0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.005, 0.01, 0.05, 0.1, 1.0,
];

/// Recorder could not be set up
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Invalid exporter settings
    #[error("Invalid Prometheus exporter settings: {0}")]
    Build(String),
    /// The global recorder could not be installed
    #[error("Could not install the Prometheus recorder: {0}")]
    Install(String),
}

/// Installed Prometheus recorder
///
/// `handle` is `None` when some other recorder was already global, which
/// happens when several tests in one process install their own.
#[derive(Clone)]
pub struct PrometheusRecorder {
    handle: Option<PrometheusHandle>,
}

impl PrometheusRecorder {
    /// Describe the store metrics and install the recorder globally
    ///
    /// # Errors
    ///
    /// [`MetricsError::Build`] for bad bucket settings,
    /// [`MetricsError::Install`] for any install failure other than a
    /// recorder already being present.
    pub fn install() -> Result<Self, MetricsError> {
        describe_store_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(Matcher::Suffix("duration_seconds".to_owned()), DURATION_BUCKETS)
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                tracing::info!("Prometheus recorder installed");
                Ok(Self { handle: Some(handle) })
            },
            Err(BuildError::FailedToSetGlobalRecorder(_)) => {
                tracing::warn!("A metrics recorder is already installed; keeping it");
                Ok(Self { handle: None })
            },
            Err(e) => Err(MetricsError::Install(e.to_string())),
        }
    }

    /// Whether this recorder is the global one
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Prometheus text exposition of everything recorded so far
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

impl std::fmt::Debug for PrometheusRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusRecorder").field("active", &self.is_active()).finish()
    }
}

fn describe_store_metrics() {
    describe_counter!("store.actions.total", "Actions reduced by the store");
    describe_histogram!("store.reducer.duration_seconds", "Time spent inside reduce");
    describe_histogram!("store.effects.count", "Effects returned per action");
    describe_counter!("store.effects.executed", "Effects started, labelled by variant");
    describe_counter!("store.effects.cancelled", "In-flight effects aborted by Effect::Cancel");
    describe_counter!("store.shutdown.initiated", "Shutdowns started");
    describe_counter!("store.shutdown.completed", "Shutdowns that drained every effect");
    describe_counter!("store.shutdown.timeout", "Shutdowns that hit their deadline");
    describe_counter!("store.shutdown.rejected_actions", "Sends refused during shutdown");
}
