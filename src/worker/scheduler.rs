use std::{
    collections::HashMap,
    fmt,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{
        mpsc::{self, RecvTimeoutError, Sender},
        Arc, Mutex,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use tracing::{debug, error, info};

use crate::errors::{OikosError, Result};

/// Work run repeatedly by the [`Scheduler`].
pub trait PeriodicJob: Send + Sync + 'static {
    fn name(&self) -> &str;
    fn run(&self);
}

/// Initial delay followed by a fixed period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub initial_delay: Duration,
    pub period: Duration,
}

impl Schedule {
    pub fn new(initial_delay: Duration, period: Duration) -> Self {
        Self {
            initial_delay,
            period,
        }
    }

    /// One hour delay, then once a day.
    pub fn daily() -> Self {
        Self::new(Duration::from_secs(60 * 60), Duration::from_secs(24 * 60 * 60))
    }
}

/// Running job thread. Dropping the handle stops the job and waits for the thread.
pub struct JobHandle {
    name: String,
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl JobHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cancel(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!(job = %self.name, "job thread panicked");
            }
        }
    }
}

impl Drop for JobHandle {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

impl fmt::Debug for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobHandle")
            .field("name", &self.name)
            .field("running", &self.thread.is_some())
            .finish()
    }
}

/// Spawns the job loop on a dedicated thread.
pub fn spawn(job: Arc<dyn PeriodicJob>, schedule: Schedule) -> Result<JobHandle> {
    if schedule.period.is_zero() {
        return Err(OikosError::InvalidInput(format!(
            "job `{}` needs a non-zero period",
            job.name()
        )));
    }
    let name = job.name().to_string();
    let (stop, stopped) = mpsc::channel::<()>();
    let thread = thread::Builder::new()
        .name(format!("oikos-job-{name}"))
        .spawn(move || {
            let mut wait = schedule.initial_delay;
            loop {
                match stopped.recv_timeout(wait) {
                    Err(RecvTimeoutError::Timeout) => {
                        debug!(job = %job.name(), "job tick");
                        if catch_unwind(AssertUnwindSafe(|| job.run())).is_err() {
                            error!(job = %job.name(), "job run panicked");
                        }
                        wait = schedule.period;
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            debug!(job = %job.name(), "job loop stopped");
        })?;
    Ok(JobHandle {
        name,
        stop: Some(stop),
        thread: Some(thread),
    })
}

/// Keeps at most one running instance per job name.
#[derive(Default)]
pub struct Scheduler {
    jobs: Mutex<HashMap<String, JobHandle>>,
    /// Serializes replacements so a stop, join and respawn happen as one step.
    replacing: Mutex<()>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `job`, replacing any instance already scheduled under the same name.
    ///
    /// The previous instance is stopped and its thread joined before the new one
    /// is spawned, so a run still in progress finishes first.
    pub fn schedule_unique(&self, job: Arc<dyn PeriodicJob>, schedule: Schedule) -> Result<()> {
        let _replacing = self
            .replacing
            .lock()
            .map_err(|_| OikosError::Storage("scheduler lock poisoned".into()))?;
        let name = job.name().to_string();
        let previous = self.lock()?.remove(&name);
        let replaced = previous.is_some();
        if let Some(previous) = previous {
            info!(job = %name, "replacing scheduled job");
            previous.cancel();
        }
        let handle = spawn(job, schedule)?;
        self.lock()?.insert(name.clone(), handle);
        if !replaced {
            info!(
                job = %name,
                delay_secs = schedule.initial_delay.as_secs(),
                period_secs = schedule.period.as_secs(),
                "job scheduled"
            );
        }
        Ok(())
    }

    pub fn cancel(&self, name: &str) -> Result<bool> {
        let handle = self.lock()?.remove(name);
        Ok(match handle {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        })
    }

    pub fn is_scheduled(&self, name: &str) -> bool {
        self.lock()
            .map(|jobs| jobs.contains_key(name))
            .unwrap_or(false)
    }

    pub fn job_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .lock()
            .map(|jobs| jobs.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Stops every job and waits for their threads.
    pub fn shutdown(&self) -> Result<()> {
        let handles: Vec<JobHandle> = self.lock()?.drain().map(|(_, handle)| handle).collect();
        for handle in handles {
            handle.cancel();
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, JobHandle>>> {
        self.jobs
            .lock()
            .map_err(|_| OikosError::Storage("scheduler lock poisoned".into()))
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter {
        name: &'static str,
        runs: Arc<AtomicUsize>,
    }

    impl PeriodicJob for Counter {
        fn name(&self) -> &str {
            self.name
        }

        fn run(&self) {
            self.runs.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn zero_period_is_rejected() {
        let job = Arc::new(Counter {
            name: "zero",
            runs: Arc::new(AtomicUsize::new(0)),
        });
        let schedule = Schedule::new(Duration::ZERO, Duration::ZERO);
        assert!(spawn(job, schedule).is_err());
    }

    #[test]
    fn cancelled_before_delay_never_runs() {
        let runs = Arc::new(AtomicUsize::new(0));
        let job = Arc::new(Counter {
            name: "slow",
            runs: Arc::clone(&runs),
        });
        let handle = spawn(job, Schedule::new(Duration::from_secs(3600), Duration::from_secs(1)))
            .unwrap();
        handle.cancel();
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
