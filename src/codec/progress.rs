// Progress notification for long reads and writes.
//
// The observer is a plain closure owned by one reader or writer and called
// inline on the scanning thread. Returning `ControlFlow::Break` asks the
// scan to stop, which surfaces as a cancellation error.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Default number of lines between progress notifications.
pub const DEFAULT_NOTIFY_EVERY: usize = 500;

/// Shared cancellation flag of one reader or writer.
///
/// Clones observe the same flag, so a handle captured by a progress
/// observer (or held by another thread) can stop the scan.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Snapshot of a scan in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileProgress {
    /// Lines read or written so far.
    pub lines_processed: usize,
    /// Bytes consumed from the source or appended to the sink so far.
    pub bytes_processed: u64,
    /// True only for the final event of a scan that ran to completion.
    pub complete: bool,
}

/// Callback receiving [`FileProgress`] events.
pub type ProgressObserver = Box<dyn FnMut(&FileProgress) -> ControlFlow<()>>;

/// Observer slot plus the cadence bookkeeping shared by readers and writers.
pub(crate) struct Notifier {
    observer: Option<ProgressObserver>,
    every: usize,
}

impl Notifier {
    pub(crate) fn new(every: usize) -> Self {
        Self {
            observer: None,
            every: every.max(1),
        }
    }

    pub(crate) fn set(&mut self, observer: ProgressObserver) {
        self.observer = Some(observer);
    }

    /// Notify if `lines` has reached the next multiple of the cadence.
    /// Returns `Break` if the observer asked to stop.
    pub(crate) fn line_done(&mut self, lines: usize, bytes: u64) -> ControlFlow<()> {
        if lines % self.every != 0 {
            return ControlFlow::Continue(());
        }
        self.emit(FileProgress {
            lines_processed: lines,
            bytes_processed: bytes,
            complete: false,
        })
    }

    /// Final event. The observer's answer is ignored: nothing is left to stop.
    pub(crate) fn finished(&mut self, lines: usize, bytes: u64) {
        let _ = self.emit(FileProgress {
            lines_processed: lines,
            bytes_processed: bytes,
            complete: true,
        });
    }

    fn emit(&mut self, event: FileProgress) -> ControlFlow<()> {
        match self.observer.as_mut() {
            Some(observer) => observer(&event),
            None => ControlFlow::Continue(()),
        }
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("observer", &self.observer.is_some())
            .field("every", &self.every)
            .finish()
    }
}
