use crate::error::{PaymentSheetError, Result};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::trace;

/// A component that recomputes its published state from a set of watch inputs.
///
/// `refresh` always reads the latest value of every input, so one call reflects
/// all changes that happened before it regardless of which input woke the loop.
pub(crate) trait Reactive: Send + 'static {
    const NAME: &'static str;

    /// Resolves when at least one input has a value not yet seen.
    fn input_changed(&mut self) -> impl Future<Output = ()> + Send;

    fn refresh(&mut self);
}

enum Control {
    Flush(oneshot::Sender<()>),
}

enum Wake {
    Input,
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Serializes refreshes with `close()`. A refresh runs only while holding the
/// gate and only if the loop has not been shut down.
#[derive(Clone, Default)]
struct RefreshGate(Arc<Mutex<()>>);

impl RefreshGate {
    fn enter(&self) -> MutexGuard<'_, ()> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Lifecycle handle of a spawned [`Reactive`] loop.
pub(crate) struct DriverHandle {
    commands: mpsc::UnboundedSender<Control>,
    shutdown: watch::Sender<bool>,
    gate: RefreshGate,
}

impl DriverHandle {
    /// Resolves once every input change made before this call has been absorbed
    /// and published.
    pub(crate) async fn flush(&self) -> Result<()> {
        if self.is_closed() {
            return Err(PaymentSheetError::InteractorClosed);
        }
        let (done, reflected) = oneshot::channel();
        self.commands
            .send(Control::Flush(done))
            .map_err(|_| PaymentSheetError::InteractorClosed)?;
        reflected.await.map_err(|_| PaymentSheetError::InteractorClosed)
    }

    /// Stops the loop. Returns only after any refresh already running has
    /// finished, so nothing is published once this returns.
    pub(crate) fn close(&self) {
        self.shutdown.send_replace(true);
        drop(self.gate.enter());
    }

    pub(crate) fn is_closed(&self) -> bool {
        *self.shutdown.borrow()
    }
}

/// Spawns the loop on the current runtime. The loop ends on `close()` or when
/// the handle is dropped.
pub(crate) fn spawn_driver<R: Reactive>(reactive: R) -> DriverHandle {
    let (commands, command_rx) = mpsc::unbounded_channel();
    let (shutdown, shutdown_rx) = watch::channel(false);
    let gate = RefreshGate::default();
    tokio::spawn(run(reactive, command_rx, shutdown_rx, gate.clone()));
    DriverHandle {
        commands,
        shutdown,
        gate,
    }
}

async fn run<R: Reactive>(
    mut reactive: R,
    mut commands: mpsc::UnboundedReceiver<Control>,
    mut shutdown: watch::Receiver<bool>,
    gate: RefreshGate,
) {
    trace!(interactor = R::NAME, "started");
    refresh(&mut reactive, &shutdown, &gate);

    loop {
        let wake = tokio::select! {
            biased;
            _ = shutdown.changed() => Wake::Shutdown,
            _ = reactive.input_changed() => Wake::Input,
            command = commands.recv() => match command {
                Some(Control::Flush(done)) => Wake::Flush(done),
                None => Wake::Shutdown,
            },
        };
        let refreshed = match wake {
            Wake::Input => refresh(&mut reactive, &shutdown, &gate),
            Wake::Flush(done) => {
                let refreshed = refresh(&mut reactive, &shutdown, &gate);
                if refreshed {
                    let _ = done.send(());
                }
                refreshed
            }
            Wake::Shutdown => false,
        };
        if !refreshed {
            break;
        }
    }

    trace!(interactor = R::NAME, "stopped");
}

/// Runs one refresh unless the loop was shut down. Returns `false` when shut down.
fn refresh<R: Reactive>(
    reactive: &mut R,
    shutdown: &watch::Receiver<bool>,
    gate: &RefreshGate,
) -> bool {
    let _entered = gate.enter();
    if *shutdown.borrow() {
        return false;
    }
    reactive.refresh();
    true
}

/// Waits for the next value on `rx`. A closed channel never changes again, so
/// it simply stops waking the loop.
pub(crate) async fn next_change<T: Send + Sync>(rx: &mut watch::Receiver<T>) {
    if rx.changed().await.is_err() {
        std::future::pending::<()>().await;
    }
}
