use crate::obs::sink::ExecKind;
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap, time::SystemTime};

///
/// EventState
/// Ephemeral, in-memory counters and simple latency totals.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct EventState {
    pub(crate) ops: EventOps,
    pub(crate) perf: EventPerf,
    pub(crate) entities: BTreeMap<String, EntityCounters>,
    pub(crate) since_ms: u64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            perf: EventPerf::default(),
            entities: BTreeMap::new(),
            since_ms: now_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Session entrypoints
    pub create_calls: u64,
    pub load_calls: u64,
    pub update_calls: u64,
    pub delete_calls: u64,
    pub check_calls: u64,

    // Rows touched
    pub rows_created: u64,
    pub rows_loaded: u64,
    pub rows_updated: u64,
    pub rows_deleted: u64,

    // Index maintenance
    pub index_inserts: u64,
    pub index_removes: u64,
    pub stale_index_refs: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EntityCounters {
    pub create_calls: u64,
    pub load_calls: u64,
    pub update_calls: u64,
    pub delete_calls: u64,
    pub rows_loaded: u64,
    pub rows_deleted: u64,
    pub index_inserts: u64,
    pub index_removes: u64,
    pub stale_index_refs: u64,
}

impl EntityCounters {
    pub(crate) const fn bump_calls(&mut self, kind: ExecKind) {
        match kind {
            ExecKind::Create => self.create_calls = self.create_calls.saturating_add(1),
            ExecKind::Load => self.load_calls = self.load_calls.saturating_add(1),
            ExecKind::Update => self.update_calls = self.update_calls.saturating_add(1),
            ExecKind::Delete => self.delete_calls = self.delete_calls.saturating_add(1),
            ExecKind::Check => {}
        }
    }
}

///
/// EventPerf
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventPerf {
    // Elapsed wall time per entrypoint, microseconds
    pub create_us_total: u128,
    pub load_us_total: u128,
    pub update_us_total: u128,
    pub delete_us_total: u128,

    // Maximum observed single-call latency
    pub create_us_max: u64,
    pub load_us_max: u64,
    pub update_us_max: u64,
    pub delete_us_max: u64,
}

///
/// EventReport
/// Point-in-time snapshot of the event state.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventReport {
    pub ops: EventOps,
    pub perf: EventPerf,
    pub entities: BTreeMap<String, EntityCounters>,
    pub since_ms: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters (useful in tests).
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

/// Snapshot the current state.
pub(crate) fn report() -> EventReport {
    with_state(|m| EventReport {
        ops: m.ops.clone(),
        perf: m.perf.clone(),
        entities: m.entities.clone(),
        since_ms: m.since_ms,
    })
}

/// Accumulate a latency sample and track a max.
pub(crate) fn add_elapsed(total: &mut u128, max: &mut u64, delta_us: u64) {
    *total = total.saturating_add(u128::from(delta_us));
    if delta_us > *max {
        *max = delta_us;
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
