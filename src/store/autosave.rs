//! Background autosave - periodic snapshot and save while the wizard is open.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Default autosave cadence (30 seconds)
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

const MIN_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(1);

/// Whatever the autosave task persists on every tick.
#[async_trait]
pub trait AutosaveTarget: Send + Sync {
    /// Snapshot the active step and save; returns whether the write succeeded
    async fn autosave(&self) -> bool;
}

struct RunningTask {
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Handle over the single autosave task.
///
/// Starting while a task is running replaces it; dropping the handle stops it.
pub struct AutoSaver {
    interval: Duration,
    task: Option<RunningTask>,
}

impl AutoSaver {
    /// Autosave every `interval`, lifted to at least one second
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_AUTOSAVE_INTERVAL),
            task: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.handle.is_finished())
    }

    /// Start ticking. The first save happens one full interval from now.
    pub fn start(&mut self, target: Arc<dyn AutosaveTarget>) {
        self.stop();

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let period = self.interval;

        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => {
                        debug!("Autosave task shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        if target.autosave().await {
                            debug!("Auto-save completed");
                        }
                    }
                }
            }
        });

        info!(interval_secs = period.as_secs(), "Auto-save started");
        self.task = Some(RunningTask {
            shutdown_tx,
            handle,
        });
    }

    /// Stop the task, returning whether one was running
    pub fn stop(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                // The receiver is gone if the task already ended; nothing to signal then.
                let _ = task.shutdown_tx.send(());
                task.handle.abort();
                info!("Auto-save stopped");
                true
            }
            None => false,
        }
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingTarget {
        saves: AtomicUsize,
    }

    #[async_trait]
    impl AutosaveTarget for CountingTarget {
        async fn autosave(&self) -> bool {
            self.saves.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    fn saves(target: &CountingTarget) -> usize {
        target.saves.load(Ordering::SeqCst)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_once_per_interval() {
        let target = Arc::new(CountingTarget::default());
        let mut saver = AutoSaver::new(DEFAULT_AUTOSAVE_INTERVAL);
        saver.start(target.clone());
        assert!(saver.is_running());

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(saves(&target), 0);

        tokio::time::sleep(Duration::from_secs(66)).await;
        assert_eq!(saves(&target), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_saves_after_stop() {
        let target = Arc::new(CountingTarget::default());
        let mut saver = AutoSaver::new(Duration::from_secs(30));
        saver.start(target.clone());

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(saves(&target), 1);

        assert!(saver.stop());
        assert!(!saver.is_running());
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(saves(&target), 1);

        assert!(!saver.stop());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_previous_timer() {
        let target = Arc::new(CountingTarget::default());
        let mut saver = AutoSaver::new(Duration::from_secs(30));
        saver.start(target.clone());
        tokio::time::sleep(Duration::from_secs(20)).await;

        // Restarting resets the cadence and must not leave the old timer alive
        saver.start(target.clone());
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(saves(&target), 0);

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(saves(&target), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_lifted() {
        let target = Arc::new(CountingTarget::default());
        let mut saver = AutoSaver::new(Duration::ZERO);
        assert_eq!(saver.interval(), Duration::from_secs(1));
        saver.start(target.clone());

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(saves(&target), 3);
        assert!(saver.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_task() {
        let target = Arc::new(CountingTarget::default());
        {
            let mut saver = AutoSaver::new(Duration::from_secs(30));
            saver.start(target.clone());
        }
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(saves(&target), 0);
    }
}
