use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info};

use crate::error::WorkerError;
use crate::pipeline::{BroadcastProgress, NoopProgress, Pipeline, ProgressReporter};
use crate::worker::job::{Job, JobResult};

/// Runs pipeline jobs on dedicated threads. Every worker owns a
/// current-thread tokio runtime and shares the same immutable pipeline.
pub struct WorkerPool {
    job_sender: Sender<Job>,
    result_receiver: Receiver<JobResult>,
    workers: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl WorkerPool {
    pub fn new(pipeline: Arc<Pipeline>, worker_count: usize) -> Result<Self, WorkerError> {
        Self::with_progress(pipeline, worker_count, None)
    }

    /// Like [`WorkerPool::new`], forwarding stage events of every run to
    /// `progress`.
    pub fn with_progress(
        pipeline: Arc<Pipeline>,
        worker_count: usize,
        progress: Option<BroadcastProgress>,
    ) -> Result<Self, WorkerError> {
        if worker_count == 0 {
            return Err(WorkerError::SpawnFailed(
                "worker_count must be greater than zero".to_string(),
            ));
        }

        let (job_sender, job_receiver) = bounded::<Job>(worker_count * 2);
        let (result_sender, result_receiver) = bounded::<JobResult>(worker_count * 2);
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let job_rx = job_receiver.clone();
            let result_tx = result_sender.clone();
            let shutdown_flag = Arc::clone(&shutdown);
            let worker_pipeline = Arc::clone(&pipeline);
            let worker_progress = progress.clone();

            let handle = thread::Builder::new()
                .name(format!("lifeadmin-worker-{}", worker_id))
                .spawn(move || {
                    run_worker(
                        worker_id,
                        job_rx,
                        result_tx,
                        shutdown_flag,
                        worker_pipeline,
                        worker_progress,
                    );
                })
                .map_err(|e| WorkerError::SpawnFailed(e.to_string()))?;
            workers.push(handle);
        }

        info!("Started {} workers", worker_count);

        Ok(Self {
            job_sender,
            result_receiver,
            workers,
            shutdown,
        })
    }

    pub fn submit(&self, job: Job) -> Result<(), WorkerError> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(WorkerError::ChannelClosed);
        }

        self.job_sender
            .send(job)
            .map_err(|_| WorkerError::ChannelClosed)
    }

    pub fn recv_result(&self) -> Option<JobResult> {
        self.result_receiver.recv().ok()
    }

    pub fn recv_result_timeout(&self, timeout: Duration) -> Option<JobResult> {
        self.result_receiver.recv_timeout(timeout).ok()
    }

    /// Workers finish their current run and stop picking up new jobs.
    pub fn shutdown(&self) {
        info!("Shutting down worker pool...");
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    pub fn wait(self) {
        drop(self.job_sender);

        for (i, worker) in self.workers.into_iter().enumerate() {
            if let Err(e) = worker.join() {
                error!("Worker {} panicked: {:?}", i, e);
            } else {
                debug!("Worker {} finished", i);
            }
        }

        info!("All workers have stopped");
    }
}

fn run_worker(
    worker_id: usize,
    job_receiver: Receiver<Job>,
    result_sender: Sender<JobResult>,
    shutdown: Arc<AtomicBool>,
    pipeline: Arc<Pipeline>,
    progress: Option<BroadcastProgress>,
) {
    debug!("Worker {} started", worker_id);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Worker {} could not start its runtime: {}", worker_id, e);
            return;
        }
    };
    let reporter: &dyn ProgressReporter = match &progress {
        Some(progress) => progress,
        None => &NoopProgress,
    };

    loop {
        if shutdown.load(Ordering::Relaxed) {
            debug!("Worker {} received shutdown signal", worker_id);
            break;
        }

        match job_receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(job) => {
                debug!("Worker {} processing job {}", worker_id, job.id);

                let result =
                    match runtime.block_on(pipeline.run_with_progress(&job.source_path, reporter)) {
                        Ok(state) => JobResult::completed(&job, state),
                        Err(e) => JobResult::rejected(&job, e.to_string()),
                    };

                if let Err(e) = result_sender.send(result) {
                    error!("Worker {} failed to send result: {}", worker_id, e);
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                debug!("Worker {} job channel disconnected", worker_id);
                break;
            }
        }
    }

    debug!("Worker {} stopped", worker_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logstore::MemoryLogStore;
    use crate::pipeline::testing::{FakeClassifier, FakeEmail, FakeOcr, FakePush, FakeTasks};
    use crate::pipeline::{ActionKind, Collaborators, PipelineConfig, StageStatus};
    use crate::task::{ParsedTask, TaskType};
    use tempfile::TempDir;

    fn pipeline(store: Arc<MemoryLogStore>) -> Arc<Pipeline> {
        let task = ParsedTask::new(TaskType::Receipt, "me@example.com", "receipt");
        let collaborators = Collaborators {
            ocr: Arc::new(FakeOcr::returning("Thanks for shopping")),
            classifier: Arc::new(FakeClassifier::returning(task)),
            tasks: Arc::new(FakeTasks::default()),
            email: Arc::new(FakeEmail::default()),
            push: Arc::new(FakePush::default()),
            log_store: store,
        };
        Arc::new(Pipeline::new(
            Arc::new(PipelineConfig::default()),
            collaborators,
        ))
    }

    #[test]
    fn test_zero_workers_rejected() {
        let store = Arc::new(MemoryLogStore::new());
        assert!(matches!(
            WorkerPool::new(pipeline(store), 0),
            Err(WorkerError::SpawnFailed(_))
        ));
    }

    #[test]
    fn test_shutdown_flag() {
        let store = Arc::new(MemoryLogStore::new());
        let pool = WorkerPool::new(pipeline(store), 2).unwrap();
        assert!(!pool.is_shutdown());

        pool.shutdown();
        assert!(pool.is_shutdown());
        assert!(matches!(
            pool.submit(Job::new("a.png".into())),
            Err(WorkerError::ChannelClosed)
        ));
        pool.wait();
    }

    #[test]
    fn test_processes_jobs_concurrently() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryLogStore::new());
        let pool = WorkerPool::new(pipeline(store.clone()), 3).unwrap();

        for i in 0..4 {
            let path = temp_dir.path().join(format!("receipt-{}.png", i));
            std::fs::write(&path, b"image").unwrap();
            pool.submit(Job::new(path)).unwrap();
        }
        pool.submit(Job::new(temp_dir.path().join("missing.png")))
            .unwrap();

        let mut completed = Vec::new();
        let mut rejected = 0;
        for _ in 0..5 {
            let result = pool.recv_result().unwrap();
            match result.state {
                Some(state) => completed.push(state),
                None => rejected += 1,
            }
        }
        pool.shutdown();
        pool.wait();

        assert_eq!(rejected, 1);
        assert_eq!(completed.len(), 4);
        for state in &completed {
            assert_eq!(state.next_action, Some(ActionKind::None));
            assert!(state.logged);
            // input, ocr, parse, decision, log
            assert_eq!(store.entries_for_run(state.run_id).len(), 5);
        }
        assert_eq!(store.len(), 20);
    }

    #[test]
    fn test_progress_forwarded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("receipt.png");
        std::fs::write(&path, b"image").unwrap();

        let progress = BroadcastProgress::new(64);
        let mut rx = progress.subscribe();
        let store = Arc::new(MemoryLogStore::new());
        let pool = WorkerPool::with_progress(pipeline(store), 1, Some(progress)).unwrap();

        pool.submit(Job::new(path)).unwrap();
        pool.recv_result().unwrap();
        pool.shutdown();
        pool.wait();

        let first = rx.try_recv().unwrap();
        assert_eq!(first.status, StageStatus::Started);
    }
}
