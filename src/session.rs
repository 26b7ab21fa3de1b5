use crate::handle::OwnedHandle;
use crate::job::JobGuard;
use crate::launch::LaunchState;

/// Everything the launcher acquires from the OS for one invocation.
///
/// Handles are released when the session drops, on every exit path. The
/// job handle goes last: if the launcher is killed before that, the OS
/// closes it and the kill-on-close limit takes the child down.
#[derive(Debug)]
pub struct Session {
    state: LaunchState,
    pub(crate) process: Option<OwnedHandle>,
    pub(crate) thread: Option<OwnedHandle>,
    job: Option<JobGuard>,
}

impl Session {
    /// Arms the lifecycle guard. The launch still goes ahead without one if
    /// the job object cannot be created.
    pub fn arm() -> Self {
        let job = match JobGuard::create() {
            Ok(job) => Some(job),
            Err(e) => {
                tracing::warn!("running without lifecycle guard: {e}");
                None
            }
        };
        Self {
            state: LaunchState::Idle,
            process: None,
            thread: None,
            job,
        }
    }

    pub fn state(&self) -> LaunchState {
        self.state
    }

    pub(crate) fn advance(&mut self, next: LaunchState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid launch transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::debug!(from = ?self.state, to = ?next, "launch state");
        self.state = next;
    }

    /// Puts the child into the job. A failure leaves the child running
    /// unguarded.
    pub(crate) fn guard_child(&self) {
        let (Some(job), Some(process)) = (&self.job, &self.process) else {
            return;
        };
        if let Err(e) = job.assign(process.raw()) {
            tracing::warn!("child not bound to launcher lifetime: {e}");
        }
    }

    /// Processes that go down with the session: the child and everything it
    /// started that is still alive. Empty when there is no job.
    pub fn guarded_processes(&self) -> Vec<u32> {
        let Some(job) = &self.job else {
            return Vec::new();
        };
        job.process_ids().unwrap_or_else(|e| {
            tracing::debug!("job process list unavailable: {e}");
            Vec::new()
        })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(pids = ?self.guarded_processes(), "closing job");
        }
        tracing::debug!(
            state = ?self.state,
            process = self.process.is_some(),
            thread = self.thread.is_some(),
            job = self.job.is_some(),
            "releasing session handles"
        );
        self.process.take();
        self.thread.take();
        self.job.take();
    }
}
