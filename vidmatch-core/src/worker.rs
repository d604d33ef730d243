// ============================================================================
// vidmatch-core/src/worker.rs
// ============================================================================
//
// BACKGROUND EXECUTION: One Comparison Worker at a Time
//
// ComparisonService runs compare_videos on a named background thread and
// streams its reporter traffic back over an mpsc channel as WorkerEvents.
// The consumer drains the channel on its own thread, so rendering state
// never crosses threads. The last event of every run is Finished.
//
// Only one run may be active per service. The running flag is cleared
// before Finished is sent, so a consumer that reacts to Finished by
// starting a new run never sees AlreadyRunning.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::cancellation::CancellationToken;
use crate::config::CompareConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::VideoOpener;
use crate::processing::comparison::{ComparisonResults, compare_videos};
use crate::reporting::{Reporter, RunStartInfo};

/// Name of the background worker thread.
pub const WORKER_THREAD_NAME: &str = "vidmatch-compare";

/// Messages from the worker to the consumer.
#[derive(Debug)]
pub enum WorkerEvent {
    Started(RunStartInfo),
    Progress(f64),
    Status(String),
    Warning(String),
    /// Always the last event of a run.
    Finished(ComparisonResults),
}

/// Reporter that forwards everything into a worker channel.
struct ChannelReporter {
    sender: Sender<WorkerEvent>,
}

impl ChannelReporter {
    fn send(&self, event: WorkerEvent) {
        // A dropped receiver means nobody is listening any more.
        let _ = self.sender.send(event);
    }
}

impl Reporter for ChannelReporter {
    fn comparison_started(&self, info: &RunStartInfo) {
        self.send(WorkerEvent::Started(info.clone()));
    }

    fn progress(&self, fraction: f64) {
        self.send(WorkerEvent::Progress(fraction));
    }

    fn status(&self, message: &str) {
        self.send(WorkerEvent::Status(message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.send(WorkerEvent::Warning(message.to_string()));
    }
}

/// Clears the running flag when dropped, including on panic.
struct RunGuard(Arc<AtomicBool>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Starts comparison runs on a background thread, one at a time.
#[derive(Debug, Clone, Default)]
pub struct ComparisonService {
    running: Arc<AtomicBool>,
}

impl ComparisonService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Starts comparing `paths` in the background.
    ///
    /// Fails synchronously with [`CoreError::Config`] for an invalid
    /// configuration and with [`CoreError::AlreadyRunning`] while a previous
    /// run has not finished.
    pub fn start<O>(
        &self,
        opener: O,
        paths: Vec<PathBuf>,
        config: CompareConfig,
    ) -> CoreResult<ComparisonJob>
    where
        O: VideoOpener + 'static,
    {
        config.validate()?;

        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::warn!("Refusing to start a comparison while another is running");
            return Err(CoreError::AlreadyRunning);
        }
        let guard = RunGuard(Arc::clone(&self.running));

        let (sender, receiver) = mpsc::channel();
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();

        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let reporter = ChannelReporter { sender };
                let results =
                    match compare_videos(&opener, &paths, &config, &reporter, &worker_cancel) {
                        Ok(results) => results,
                        Err(e) => {
                            log::error!("Comparison failed: {e}");
                            reporter.warning(&format!("Comparison failed: {e}"));
                            ComparisonResults::new()
                        }
                    };
                drop(guard);
                reporter.send(WorkerEvent::Finished(results));
            })
            .map_err(|e| {
                CoreError::OperationFailed(format!("Failed to spawn comparison worker: {e}"))
            })?;

        Ok(ComparisonJob {
            events: receiver,
            cancel,
            handle: Some(handle),
        })
    }
}

/// Consumer side of a running comparison.
pub struct ComparisonJob {
    events: Receiver<WorkerEvent>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ComparisonJob {
    /// Requests cancellation. The worker stops at the next frame or pair
    /// boundary and still sends Finished with the partial results.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this job, e.g. for a signal handler.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Blocks for the next event. None once the worker has exited and all
    /// events have been received.
    pub fn recv(&self) -> Option<WorkerEvent> {
        self.events.recv().ok()
    }

    /// Blocking iterator over the remaining events.
    pub fn events(&self) -> impl Iterator<Item = WorkerEvent> + '_ {
        self.events.iter()
    }

    /// Drains the job, forwarding every event to `reporter`, and returns the
    /// final results.
    pub fn forward_to(mut self, reporter: &dyn Reporter) -> CoreResult<ComparisonResults> {
        let mut finished = None;
        for event in self.events.iter() {
            match event {
                WorkerEvent::Started(info) => reporter.comparison_started(&info),
                WorkerEvent::Progress(fraction) => reporter.progress(fraction),
                WorkerEvent::Status(message) => reporter.status(&message),
                WorkerEvent::Warning(message) => reporter.warning(&message),
                WorkerEvent::Finished(results) => finished = Some(results),
            }
        }
        self.join()?;
        finished.ok_or_else(|| {
            CoreError::OperationFailed("Comparison worker exited without results".to_string())
        })
    }

    /// Waits for the run to end, discarding intermediate events.
    pub fn wait(self) -> CoreResult<ComparisonResults> {
        self.forward_to(&crate::reporting::NullReporter)
    }

    fn join(&mut self) -> CoreResult<()> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| {
                CoreError::OperationFailed("Comparison worker panicked".to_string())
            }),
            None => Ok(()),
        }
    }
}
