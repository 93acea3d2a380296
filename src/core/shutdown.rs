//! Shutdown coordination
//!
//! One coordinator is created at startup. The refresh loop and the HTTP
//! server each hold a receiver; a signal (or a test) triggers both.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcasts a single shutdown request to every subscriber
#[derive(Clone)]
pub struct ShutdownCoordinator {
    shutdown_tx: broadcast::Sender<()>,
    shutdown_requested: Arc<AtomicBool>,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(8);
        Self {
            shutdown_tx,
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Subscribe to shutdown notifications
    ///
    /// A receiver created after `trigger_shutdown` misses the broadcast, so
    /// long-running subscribers should also consult `is_shutdown_requested`.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::Release);
        let _ = self.shutdown_tx.send(());
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }

    /// Future that resolves once shutdown has been requested
    pub async fn wait(&self) {
        let mut rx = self.subscribe();
        if self.is_shutdown_requested() {
            return;
        }
        // Lagged or closed both mean the request was sent
        let _ = rx.recv().await;
    }

    /// Route SIGINT/SIGTERM/SIGHUP/SIGQUIT (or Ctrl-C elsewhere) to this coordinator
    ///
    /// A second signal forces an immediate exit with status 130.
    pub fn install_signal_handlers(&self) {
        #[cfg(unix)]
        {
            use std::sync::atomic::AtomicUsize;
            use tokio::signal::unix::{signal, SignalKind};

            unsafe {
                libc::signal(libc::SIGPIPE, libc::SIG_DFL);
            }

            let signal_count = Arc::new(AtomicUsize::new(0));
            let signals = [
                SignalKind::interrupt(),
                SignalKind::terminate(),
                SignalKind::hangup(),
                SignalKind::quit(),
            ];

            for kind in signals {
                let coordinator = self.clone();
                let sig_ctr = signal_count.clone();

                tokio::spawn(async move {
                    if let Ok(mut sig) = signal(kind) {
                        while sig.recv().await.is_some() {
                            let prev = sig_ctr.fetch_add(1, Ordering::AcqRel);
                            if prev >= 1 {
                                log::warn!("Second shutdown signal received; exiting");
                                std::process::exit(130);
                            }
                            log::info!("Shutdown signal received");
                            coordinator.trigger_shutdown();
                        }
                    }
                });
            }
        }

        #[cfg(not(unix))]
        {
            let coordinator = self.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::info!("Ctrl-C received");
                    coordinator.trigger_shutdown();
                }
            });
        }
    }
}
