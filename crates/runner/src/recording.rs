// crates/runner/src/recording.rs
// In-memory launcher that records calls, for server and worker tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{resource_name, JobLauncher, LaunchError};

/// Test double for [`JobLauncher`].
///
/// Records every start/delete call and can be flipped to reject starts, so
/// tests can assert both that a container was requested and that validation
/// failures never reach the runner.
#[derive(Default)]
pub struct RecordingLauncher {
    started: Mutex<Vec<(String, String)>>,
    deleted: Mutex<Vec<String>>,
    reject_starts: AtomicBool,
    reject_deletes: AtomicBool,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `start` calls fail as if the runner rejected them.
    pub fn reject_starts(&self) {
        self.reject_starts.store(true, Ordering::SeqCst);
    }

    /// Make subsequent `delete` calls fail.
    pub fn reject_deletes(&self) {
        self.reject_deletes.store(true, Ordering::SeqCst);
    }

    /// `(job_id, job_type)` pairs passed to `start`, in call order.
    pub fn started(&self) -> Vec<(String, String)> {
        self.started.lock().expect("recording lock").clone()
    }

    /// Resource names passed to `delete`, in call order.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().expect("recording lock").clone()
    }
}

#[async_trait]
impl JobLauncher for RecordingLauncher {
    async fn start(&self, job_id: &str, job_type: &str) -> Result<String, LaunchError> {
        // Record the attempt either way so tests can find the job id even
        // when the runner is rejecting.
        self.started
            .lock()
            .expect("recording lock")
            .push((job_id.to_string(), job_type.to_string()));
        if self.reject_starts.load(Ordering::SeqCst) {
            return Err(LaunchError::Rejected {
                status: 503,
                body: "runner unavailable".to_string(),
            });
        }
        Ok(resource_name(job_id))
    }

    async fn delete(&self, resource: &str) -> Result<(), LaunchError> {
        if self.reject_deletes.load(Ordering::SeqCst) {
            return Err(LaunchError::Rejected {
                status: 503,
                body: "runner unavailable".to_string(),
            });
        }
        self.deleted
            .lock()
            .expect("recording lock")
            .push(resource.to_string());
        Ok(())
    }
}
