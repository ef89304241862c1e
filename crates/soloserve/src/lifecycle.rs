//! Engine worker lifecycle.
//!
//! The engine's processing loop runs on a dedicated OS thread, started after
//! the model loads and before any request is dispatched. Teardown always
//! follows the same order: trip the cancellation token, terminate the loop,
//! join the thread.

use std::sync::Arc;
use std::thread;

use soloserve_core::{CancelToken, Engine, Result};

/// Owns the thread running the engine's processing loop.
pub struct WorkerHandle {
    engine: Arc<dyn Engine>,
    handle: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    /// Spawns the processing loop on a named thread.
    ///
    /// # Errors
    ///
    /// Fails when the OS refuses to spawn the thread.
    pub fn spawn(engine: Arc<dyn Engine>) -> Result<Self> {
        let loop_engine = Arc::clone(&engine);
        let handle = thread::Builder::new()
            .name("engine-loop".to_string())
            .spawn(move || loop_engine.start_loop())?;
        tracing::debug!("engine loop started");
        Ok(Self {
            engine,
            handle: Some(handle),
        })
    }

    /// Terminates the loop and joins the thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.engine.terminate();
            if handle.join().is_err() {
                tracing::error!("engine loop panicked during shutdown");
            } else {
                tracing::debug!("engine loop joined");
            }
        }
    }
}

impl Drop for WorkerHandle {
    // Backstop for early-return paths; shutdown() is the normal route.
    fn drop(&mut self) {
        self.stop();
    }
}

/// Trips `cancel` on Ctrl-C or SIGTERM.
pub fn install_signal_handlers(cancel: CancelToken) {
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            let mut sigterm =
                match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to install SIGTERM handler");
                        if ctrl_c.await.is_ok() {
                            cancel.cancel();
                        }
                        return;
                    }
                };
            tokio::select! {
                _ = ctrl_c => {}
                _ = sigterm.recv() => {}
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
        }

        tracing::info!("shutdown signal received");
        cancel.cancel();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::echo::EchoEngine;

    #[test]
    fn shutdown_joins_the_loop() {
        let engine: Arc<dyn Engine> = Arc::new(EchoEngine::new());
        let worker = WorkerHandle::spawn(engine).unwrap();
        worker.shutdown();
    }

    #[test]
    fn drop_without_shutdown_still_terminates() {
        let engine: Arc<dyn Engine> = Arc::new(EchoEngine::new());
        let worker = WorkerHandle::spawn(engine).unwrap();
        drop(worker);
    }

    #[test]
    fn shutdown_is_safe_after_terminate() {
        let engine: Arc<dyn Engine> = Arc::new(EchoEngine::new());
        engine.terminate();
        let worker = WorkerHandle::spawn(Arc::clone(&engine)).unwrap();
        worker.shutdown();
    }
}
