//! Capture of unrecoverable faults raised by a command.
//!
//! A process-wide panic hook is installed once. While a thread is polling a
//! supervised future, the hook records a backtrace for the fault instead of
//! printing the default panic message; panics anywhere else go to the hook
//! that was installed before.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use futures_util::FutureExt;

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static LAST_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static INSTALL_HOOK: Once = Once::new();

/// Installs the fault-capturing panic hook. Subsequent calls do nothing.
pub fn install_fault_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CAPTURING.with(Cell::get) {
                let trace = Backtrace::force_capture().to_string();
                LAST_TRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            } else {
                previous(info);
            }
        }));
    });
}

/// Marks the current thread as supervised until dropped.
struct FaultScope {
    previous: bool,
}

impl FaultScope {
    fn enter() -> Self {
        Self {
            previous: CAPTURING.with(|flag| flag.replace(true)),
        }
    }
}

impl Drop for FaultScope {
    fn drop(&mut self) {
        CAPTURING.with(|flag| flag.set(self.previous));
    }
}

/// An unrecoverable fault and the stack it was raised from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// The panic payload rendered as text.
    pub message: String,
    /// Stack trace captured when the fault was raised.
    pub stack: String,
}

impl Fault {
    /// Builds a fault from a caught panic payload.
    ///
    /// Uses the trace recorded by the hook on this thread when there is one,
    /// otherwise captures a trace at the catch site.
    #[must_use]
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|text| (*text).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| String::from("Box<dyn Any>"));
        let stack = LAST_TRACE
            .with(|slot| slot.borrow_mut().take())
            .unwrap_or_else(|| Backtrace::force_capture().to_string());

        Self { message, stack }
    }

    /// The fault followed by its stack trace, as sent in event reports.
    #[must_use]
    pub fn report_value(&self) -> String {
        format!("{}\n{}", self.message, self.stack)
    }
}

/// Drives `future` to completion, converting a panic into a [`Fault`].
///
/// Every poll of `future` runs inside a fault scope, so the backtrace is
/// captured on whichever thread raises the panic.
///
/// # Errors
///
/// Returns the [`Fault`] if `future` panics.
pub async fn supervise<F: Future>(future: F) -> Result<F::Output, Fault> {
    let mut future = Box::pin(future);
    let guarded = std::future::poll_fn(move |cx| {
        let _scope = FaultScope::enter();
        future.as_mut().poll(cx)
    });

    AssertUnwindSafe(guarded)
        .catch_unwind()
        .await
        .map_err(Fault::from_payload)
}
