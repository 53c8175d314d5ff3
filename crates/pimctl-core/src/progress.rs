//! Indeterminate progress while one long-running operation completes.
//!
//! The operation runs on its own tokio task and hands back a single
//! `PimResult<T>` through a oneshot channel. In interactive mode the
//! foreground spins until that result arrives or the user interrupts.

use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::io::IsTerminal;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::{PimError, PimResult};

/// A future that resolves when the user asks to stop waiting.
pub type InterruptFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

type InterruptSource = Box<dyn Fn() -> InterruptFuture + Send + Sync>;

/// How progress is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStrategy {
    /// Animated spinner; Ctrl-C stops the wait.
    Interactive,
    /// One line announcing the operation, then an inline await.
    Plain,
}

impl ProgressStrategy {
    /// Plain when asked for or when stdout is not a terminal.
    pub fn detect(non_interactive: bool) -> Self {
        if non_interactive || !std::io::stdout().is_terminal() {
            Self::Plain
        } else {
            Self::Interactive
        }
    }
}

/// Lifecycle of the operation most recently run through the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayState {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
    Interrupted,
}

/// What to do when the user interrupts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnInterrupt {
    Cancel,
    KeepWaiting,
}

/// Runs one operation at a time with a progress indicator.
///
/// Taking `&mut self` in [`run`](Self::run) keeps a single operation in
/// flight per overlay.
pub struct ProgressOverlay {
    strategy: ProgressStrategy,
    interrupt: InterruptSource,
    state: OverlayState,
}

impl std::fmt::Debug for ProgressOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressOverlay")
            .field("strategy", &self.strategy)
            .field("state", &self.state)
            .finish()
    }
}

fn ctrl_c() -> InterruptFuture {
    Box::pin(async {
        if tokio::signal::ctrl_c().await.is_err() {
            // No handler could be installed; never report an interrupt.
            std::future::pending::<()>().await;
        }
    })
}

fn create_spinner(title: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} {elapsed:.dim}")
            .expect("Invalid spinner template"),
    );
    spinner.set_message(title.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Spinner text after an interrupt in shielded mode.
fn shielded_message(title: &str) -> String {
    format!("{title} (interrupted, waiting for any request already sent)")
}

impl ProgressOverlay {
    /// Overlay using Ctrl-C as the interrupt.
    pub fn new(strategy: ProgressStrategy) -> Self {
        Self {
            strategy,
            interrupt: Box::new(ctrl_c),
            state: OverlayState::Idle,
        }
    }

    /// Replace the interrupt source; each run calls `source` once.
    pub fn with_interrupt<F>(mut self, source: F) -> Self
    where
        F: Fn() -> InterruptFuture + Send + Sync + 'static,
    {
        self.interrupt = Box::new(source);
        self
    }

    pub fn strategy(&self) -> ProgressStrategy {
        self.strategy
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// Run `operation` under `title`.
    ///
    /// On interrupt the token handed to `operation` is cancelled, aborting
    /// any in-flight executor call, and [`PimError::Interrupted`] is
    /// returned.
    pub async fn run<T, F, Fut>(&mut self, title: &str, operation: F) -> PimResult<T>
    where
        T: Send + 'static,
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = PimResult<T>> + Send + 'static,
    {
        self.drive(title, operation, OnInterrupt::Cancel).await
    }

    /// Like [`run`](Self::run), but an interrupt does not abandon the
    /// operation. The token is still cancelled so work that has not been
    /// sent stops, and the overlay waits for whatever the operation
    /// returns. Operations that must not be cut off mid-request stop
    /// watching the token once the request is out.
    pub async fn run_shielded<T, F, Fut>(&mut self, title: &str, operation: F) -> PimResult<T>
    where
        T: Send + 'static,
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = PimResult<T>> + Send + 'static,
    {
        self.drive(title, operation, OnInterrupt::KeepWaiting).await
    }

    /// [`run`](Self::run) for operations with no value.
    pub async fn run_action<F, Fut>(&mut self, title: &str, operation: F) -> PimResult<()>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = PimResult<()>> + Send + 'static,
    {
        self.run(title, operation).await
    }

    async fn drive<T, F, Fut>(
        &mut self,
        title: &str,
        operation: F,
        on_interrupt: OnInterrupt,
    ) -> PimResult<T>
    where
        T: Send + 'static,
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = PimResult<T>> + Send + 'static,
    {
        self.state = OverlayState::Running;
        let cancel = CancellationToken::new();

        let result = match self.strategy {
            ProgressStrategy::Plain => {
                eprintln!("{title}...");
                operation(cancel).await
            }
            ProgressStrategy::Interactive => {
                self.drive_interactive(title, operation(cancel.clone()), cancel, on_interrupt)
                    .await
            }
        };

        self.state = match &result {
            Ok(_) => OverlayState::Completed,
            Err(e) if e.is_interruption() => OverlayState::Interrupted,
            Err(_) => OverlayState::Failed,
        };
        result
    }

    async fn drive_interactive<T, Fut>(
        &self,
        title: &str,
        future: Fut,
        cancel: CancellationToken,
        on_interrupt: OnInterrupt,
    ) -> PimResult<T>
    where
        T: Send + 'static,
        Fut: Future<Output = PimResult<T>> + Send + 'static,
    {
        let (tx, mut rx) = oneshot::channel();
        tokio::spawn(async move {
            // The receiver is gone only if the overlay stopped waiting.
            let _ = tx.send(future.await);
        });

        let spinner = create_spinner(title);
        let interrupt = (self.interrupt)();

        let delivered = tokio::select! {
            result = &mut rx => Some(result),
            _ = interrupt => None,
        };

        let delivered = match (delivered, on_interrupt) {
            (Some(result), _) => result,
            (None, OnInterrupt::Cancel) => {
                cancel.cancel();
                spinner.finish_and_clear();
                return Err(PimError::Interrupted);
            }
            (None, OnInterrupt::KeepWaiting) => {
                cancel.cancel();
                spinner.set_message(shielded_message(title));
                rx.await
            }
        };

        spinner.finish_and_clear();
        delivered.map_err(|_| {
            PimError::Internal(format!("{title}: operation ended without a result"))
        })?
    }
}
