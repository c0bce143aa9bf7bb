//! Process shutdown coordination.
//!
//! The flag lives in a `tokio::sync::watch` channel, so a task that
//! subscribes after shutdown was requested still observes it.

use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

/// Owner of the shutdown flag. Trips once and stays tripped.
pub struct ShutdownController {
    flag: watch::Sender<bool>,
}

/// A handle a subsystem awaits to learn that it should stop.
#[derive(Clone)]
pub struct ShutdownSignal {
    flag: watch::Receiver<bool>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self { flag }
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            flag: self.flag.subscribe(),
        }
    }

    pub fn trigger(&self) {
        self.flag.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.flag.borrow()
    }

    /// Trip the flag on the first SIGINT or SIGTERM.
    pub async fn trigger_on_os_signal(&self) {
        #[cfg(unix)]
        let sigterm = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    warn!(error = %e, "SIGTERM handler unavailable, waiting on SIGINT only");
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let sigterm = std::future::pending::<()>();

        tokio::select! {
            result = signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!(error = %e, "SIGINT handler failed");
                }
                info!(signal = "SIGINT", "shutdown requested");
            }
            _ = sigterm => info!(signal = "SIGTERM", "shutdown requested"),
        }
        self.trigger();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// Resolve once shutdown has been requested. Also resolves if the
    /// controller was dropped.
    pub async fn wait(mut self) {
        let _ = self.flag.wait_for(|stopping| *stopping).await;
    }
}
