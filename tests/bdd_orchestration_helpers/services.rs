//! In-memory stand-ins for the network services.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use infracost::BoxFuture;
use infracost::error::{EventsError, UpdateError};
use infracost::events::{EventReport, EventReporter};
use infracost::update::ReleaseSource;

/// Release source answering with a fixed tag, or failing when there is none.
pub(crate) struct FixedRelease {
    pub(crate) tag: Option<String>,
}

impl ReleaseSource for FixedRelease {
    fn latest_version(&self) -> BoxFuture<'_, Result<String, UpdateError>> {
        let tag = self.tag.clone();
        Box::pin(async move {
            tag.ok_or_else(|| UpdateError::RequestFailed {
                message: String::from("no release published"),
            })
        })
    }
}

/// Reporter that records the value of every report it is sent.
#[derive(Clone, Default)]
pub(crate) struct RecordingReporter {
    pub(crate) values: Arc<Mutex<Vec<String>>>,
}

impl RecordingReporter {
    pub(crate) fn values(&self) -> Vec<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventReporter for RecordingReporter {
    fn send(&self, report: EventReport) -> BoxFuture<'_, Result<(), EventsError>> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.body.report_value);
        Box::pin(async { Ok(()) })
    }
}

/// Shared in-memory output stream.
#[derive(Clone, Default)]
pub(crate) struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    pub(crate) fn text(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
