//! Metrics sink boundary.
//!
//! Session code emits `MetricsEvent`s and never writes metrics state itself.
//! `GlobalMetricsSink` is the default bridge into the thread-local state;
//! a session may route events to its own sink instead.
use crate::obs::metrics::{self, EventReport};
use std::{cell::Cell, time::Instant};

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecKind {
    Create,
    Load,
    Update,
    Delete,
    Check,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MetricsEvent {
    ExecStart {
        kind: ExecKind,
        entity: &'static str,
    },
    ExecFinish {
        kind: ExecKind,
        entity: &'static str,
        rows_touched: u64,
        elapsed_us: u64,
    },
    IndexDelta {
        entity: &'static str,
        inserts: u64,
        removes: u64,
    },
    /// An index member pointed at a row that no longer exists.
    StaleIndexRef {
        entity: &'static str,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent);
}

///
/// GlobalMetricsSink
///
/// Process-default sink writing into thread-local event state.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::ExecStart { kind, entity } => {
                metrics::with_state_mut(|m| {
                    match kind {
                        ExecKind::Create => {
                            m.ops.create_calls = m.ops.create_calls.saturating_add(1);
                        }
                        ExecKind::Load => m.ops.load_calls = m.ops.load_calls.saturating_add(1),
                        ExecKind::Update => {
                            m.ops.update_calls = m.ops.update_calls.saturating_add(1);
                        }
                        ExecKind::Delete => {
                            m.ops.delete_calls = m.ops.delete_calls.saturating_add(1);
                        }
                        ExecKind::Check => m.ops.check_calls = m.ops.check_calls.saturating_add(1),
                    }

                    m.entities
                        .entry(entity.to_string())
                        .or_default()
                        .bump_calls(kind);
                });
            }

            MetricsEvent::ExecFinish {
                kind,
                entity,
                rows_touched,
                elapsed_us,
            } => {
                metrics::with_state_mut(|m| {
                    let (ops, perf) = (&mut m.ops, &mut m.perf);
                    match kind {
                        ExecKind::Create => {
                            ops.rows_created = ops.rows_created.saturating_add(rows_touched);
                            metrics::add_elapsed(
                                &mut perf.create_us_total,
                                &mut perf.create_us_max,
                                elapsed_us,
                            );
                        }
                        ExecKind::Load => {
                            ops.rows_loaded = ops.rows_loaded.saturating_add(rows_touched);
                            metrics::add_elapsed(
                                &mut perf.load_us_total,
                                &mut perf.load_us_max,
                                elapsed_us,
                            );
                        }
                        ExecKind::Update => {
                            ops.rows_updated = ops.rows_updated.saturating_add(rows_touched);
                            metrics::add_elapsed(
                                &mut perf.update_us_total,
                                &mut perf.update_us_max,
                                elapsed_us,
                            );
                        }
                        ExecKind::Delete => {
                            ops.rows_deleted = ops.rows_deleted.saturating_add(rows_touched);
                            metrics::add_elapsed(
                                &mut perf.delete_us_total,
                                &mut perf.delete_us_max,
                                elapsed_us,
                            );
                        }
                        ExecKind::Check => {}
                    }

                    let entry = m.entities.entry(entity.to_string()).or_default();
                    match kind {
                        ExecKind::Load => {
                            entry.rows_loaded = entry.rows_loaded.saturating_add(rows_touched);
                        }
                        ExecKind::Delete => {
                            entry.rows_deleted = entry.rows_deleted.saturating_add(rows_touched);
                        }
                        ExecKind::Create | ExecKind::Update | ExecKind::Check => {}
                    }
                });
            }

            MetricsEvent::IndexDelta {
                entity,
                inserts,
                removes,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.index_inserts = m.ops.index_inserts.saturating_add(inserts);
                    m.ops.index_removes = m.ops.index_removes.saturating_add(removes);
                    let entry = m.entities.entry(entity.to_string()).or_default();
                    entry.index_inserts = entry.index_inserts.saturating_add(inserts);
                    entry.index_removes = entry.index_removes.saturating_add(removes);
                });
            }

            MetricsEvent::StaleIndexRef { entity } => {
                metrics::with_state_mut(|m| {
                    m.ops.stale_index_refs = m.ops.stale_index_refs.saturating_add(1);
                    let entry = m.entities.entry(entity.to_string()).or_default();
                    entry.stale_index_refs = entry.stale_index_refs.saturating_add(1);
                });
            }
        }
    }
}

pub(crate) static GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

/// Snapshot the current thread's metrics state.
#[must_use]
pub fn metrics_report() -> EventReport {
    metrics::report()
}

/// Reset the current thread's metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Span
/// RAII guard that emits start/finish events for one session call.
/// Index deltas are accumulated and flushed with the finish event, so
/// accounting happens on every exit path, including `?` returns.

pub(crate) struct Span<'a> {
    sink: &'a dyn MetricsSink,
    kind: ExecKind,
    entity: &'static str,
    start: Instant,
    rows: u64,
    inserts: Cell<u64>,
    removes: Cell<u64>,
}

impl<'a> Span<'a> {
    #[must_use]
    pub(crate) fn new(sink: &'a dyn MetricsSink, kind: ExecKind, entity: &'static str) -> Self {
        sink.record(MetricsEvent::ExecStart { kind, entity });

        Self {
            sink,
            kind,
            entity,
            start: Instant::now(),
            rows: 0,
            inserts: Cell::new(0),
            removes: Cell::new(0),
        }
    }

    pub(crate) const fn set_rows(&mut self, rows: u64) {
        self.rows = rows;
    }

    pub(crate) fn index_insert(&self) {
        self.inserts.set(self.inserts.get().saturating_add(1));
    }

    pub(crate) fn index_remove(&self) {
        self.removes.set(self.removes.get().saturating_add(1));
    }

    pub(crate) fn stale_ref(&self) {
        self.sink
            .record(MetricsEvent::StaleIndexRef { entity: self.entity });
    }
}

impl Drop for Span<'_> {
    fn drop(&mut self) {
        let (inserts, removes) = (self.inserts.get(), self.removes.get());
        if inserts > 0 || removes > 0 {
            self.sink.record(MetricsEvent::IndexDelta {
                entity: self.entity,
                inserts,
                removes,
            });
        }

        let elapsed_us = u64::try_from(self.start.elapsed().as_micros()).unwrap_or(u64::MAX);

        self.sink.record(MetricsEvent::ExecFinish {
            kind: self.kind,
            entity: self.entity,
            rows_touched: self.rows,
            elapsed_us,
        });
    }
}
