//! Ready-made handlers for common wiring.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::handler::{Context, Handler};

/// Handler that logs every event at debug level.
pub fn logging<E: fmt::Debug>() -> Handler<E> {
    Handler::new(log_event::<E>)
}

fn log_event<E: fmt::Debug>(event: &E, _context: Option<&Context>) {
    debug!(?event, "event broadcast");
}

/// Handler that counts its invocations, paired with the counter it
/// writes to.
///
/// Each call returns an independent registration: the counter `Arc` is
/// the bound context, so two counting handlers are never equal to each
/// other.
pub fn counting<E>() -> (Handler<E>, Arc<AtomicU64>) {
    let counter = Arc::new(AtomicU64::new(0));
    let handler = Handler::with_context(count_event::<E>, counter.clone());
    (handler, counter)
}

fn count_event<E>(_event: &E, context: Option<&Context>) {
    if let Some(counter) = context.and_then(|context| context.downcast_ref::<AtomicU64>()) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Shared invocation log appended to by [`recording`] handlers.
pub type InvocationLog = Arc<Mutex<Vec<String>>>;

struct Recorder {
    label: String,
    log: InvocationLog,
}

/// Handler that appends `label` to `log` on every invocation.
///
/// Several recording handlers over one log reconstruct the order in
/// which a dispatcher ran them.
pub fn recording<E>(label: impl Into<String>, log: InvocationLog) -> Handler<E> {
    let recorder = Arc::new(Recorder {
        label: label.into(),
        log,
    });
    Handler::with_context(record_event::<E>, recorder)
}

fn record_event<E>(_event: &E, context: Option<&Context>) {
    if let Some(recorder) = context.and_then(|context| context.downcast_ref::<Recorder>()) {
        recorder.log.lock().push(recorder.label.clone());
    }
}
