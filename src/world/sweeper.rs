//! Background sweep worker
//!
//! Drives [`ChunkCache::sweep_one`] on its own thread at the cache's sweep
//! interval. A crossbeam channel doubles as the cancellation flag: sending
//! on it, or dropping the sender, stops the loop.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};

use crate::world::cache::{SharedChunkCache, SweepOutcome};
use crate::world::clock::Clock;
use crate::world::loader::ChunkLoaderPort;

pub struct SweepWorker {
    shutdown_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SweepWorker {
    /// Start sweeping at the cache's configured sweep interval.
    pub fn spawn<L, C>(cache: SharedChunkCache<L, C>) -> io::Result<Self>
    where
        L: ChunkLoaderPort + Send + 'static,
        C: Clock + 'static,
    {
        let interval = cache.lock().config().sweep_interval();
        Self::with_interval(cache, interval)
    }

    pub fn with_interval<L, C>(cache: SharedChunkCache<L, C>, interval: Duration) -> io::Result<Self>
    where
        L: ChunkLoaderPort + Send + 'static,
        C: Clock + 'static,
    {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("chunk-sweeper".to_string())
            .spawn(move || sweep_loop(cache, interval, shutdown_rx))?;

        tracing::info!("Sweep worker started ({:?} interval)", interval);
        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Stop the worker and wait for its thread to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.try_send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Sweep worker panicked");
            } else {
                tracing::info!("Sweep worker stopped");
            }
        }
    }
}

impl Drop for SweepWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn sweep_loop<L, C>(cache: SharedChunkCache<L, C>, interval: Duration, shutdown_rx: Receiver<()>)
where
    L: ChunkLoaderPort,
    C: Clock,
{
    loop {
        match shutdown_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                let outcome = {
                    let mut cache = cache.lock();
                    let now = cache.now();
                    cache.sweep_one(now)
                };
                if let SweepOutcome::UnloadFailed(coord, e) = outcome {
                    tracing::error!("Leaked backend resource for chunk {}: {}", coord, e);
                }
            }
            // Shutdown requested or the worker handle was dropped
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}
