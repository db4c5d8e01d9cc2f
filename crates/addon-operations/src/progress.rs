use std::sync::atomic::{AtomicU64, Ordering};

use addon_events::{AddOnEvent, EventSink, OperationId};

/// Returns a process-wide unique operation id.
pub fn next_op_id() -> OperationId {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Emits batch progress after one more descriptor finished.
pub fn emit_batch_progress(events: &dyn EventSink, completed: usize, total: usize, failed: usize) {
    events.emit(AddOnEvent::BatchProgress {
        completed: completed as u32,
        total: total as u32,
        failed: failed as u32,
    });
}
