//! Observability: runtime counters and the sink boundary.
//!
//! Session logic never touches metrics state directly; it emits
//! `MetricsEvent`s through a `MetricsSink`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EntityCounters, EventOps, EventPerf, EventReport};
pub use sink::{
    ExecKind, GlobalMetricsSink, MetricsEvent, MetricsSink, metrics_report, metrics_reset_all,
};
