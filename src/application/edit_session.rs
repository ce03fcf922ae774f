use crate::domain::payment_option::{CardBrand, SavedInstrument};
use crate::domain::ports::{RemoverRef, UpdaterRef};
use crate::domain::strings::{ResolvableString, StringId};
use crate::error::{OperationError, PaymentSheetError, Result};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EditStatus {
    #[default]
    Idle,
    Removing,
    Updating,
}

/// State of one editing session. `instrument` is the saved baseline: its
/// preferred brand is what `chosen_brand` is compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub instrument: SavedInstrument,
    pub chosen_brand: CardBrand,
    pub status: EditStatus,
    pub error: Option<ResolvableString>,
}

impl EditSession {
    pub fn can_update(&self) -> bool {
        self.chosen_brand != self.instrument.preferred_brand()
    }

    pub fn view_state(&self) -> EditViewState {
        EditViewState {
            last4: self.instrument.last4.clone().unwrap_or_default(),
            display_name: ResolvableString::literal(self.instrument.brand.display_name()),
            selected_brand: self.chosen_brand,
            available_brands: self.instrument.available_brands(),
            can_update: self.can_update(),
            status: self.status,
            error: self.error.clone(),
        }
    }
}

/// What the edit screen renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditViewState {
    pub last4: String,
    pub display_name: ResolvableString,
    pub selected_brand: CardBrand,
    pub available_brands: Vec<CardBrand>,
    pub can_update: bool,
    pub status: EditStatus,
    pub error: Option<ResolvableString>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditViewAction {
    OnRemovePressed,
    OnUpdatePressed,
    OnBrandChoiceChanged(CardBrand),
}

/// Edits one saved card: brand choice, removal and network update.
///
/// Only one remote operation runs at a time; requests arriving while one is in
/// flight are ignored. Remote calls run on detached tasks so that `close()` stops
/// observing them without cancelling the call itself.
pub struct EditSessionInteractor {
    state: Arc<watch::Sender<EditSession>>,
    closed: Arc<watch::Sender<bool>>,
    remover: RemoverRef,
    updater: UpdaterRef,
}

impl EditSessionInteractor {
    /// Fails with [`PaymentSheetError::NotEditable`] for anything but a card with
    /// known last four digits.
    pub fn new(
        instrument: SavedInstrument,
        remover: RemoverRef,
        updater: UpdaterRef,
    ) -> Result<Self> {
        if !instrument.is_card() {
            return Err(PaymentSheetError::NotEditable(format!(
                "{} is a {} payment method, not a card",
                instrument.id, instrument.method_type
            )));
        }
        if instrument.last4.is_none() {
            return Err(PaymentSheetError::NotEditable(format!(
                "card {} has no last4",
                instrument.id
            )));
        }

        trace!(id = %instrument.id, "edit session opened");
        let session = EditSession {
            chosen_brand: instrument.preferred_brand(),
            instrument,
            status: EditStatus::Idle,
            error: None,
        };
        Ok(Self {
            state: Arc::new(watch::channel(session).0),
            closed: Arc::new(watch::channel(false).0),
            remover,
            updater,
        })
    }

    pub fn session(&self) -> EditSession {
        self.state.borrow().clone()
    }

    pub fn view_state(&self) -> EditViewState {
        self.state.borrow().view_state()
    }

    pub fn subscribe(&self) -> watch::Receiver<EditSession> {
        self.state.subscribe()
    }

    pub fn handle_view_action(&self, action: EditViewAction) -> Result<()> {
        if self.is_closed() {
            return Err(PaymentSheetError::InteractorClosed);
        }
        debug!(?action, "edit view action");

        match action {
            EditViewAction::OnRemovePressed => self.request_remove(),
            EditViewAction::OnUpdatePressed => self.request_update(),
            EditViewAction::OnBrandChoiceChanged(brand) => self.change_brand_choice(brand),
        }
        Ok(())
    }

    /// Resolves once no remote operation is in flight, or once the session is
    /// closed. A closed session keeps its last status.
    pub async fn idle(&self) {
        let mut session = self.state.subscribe();
        let mut closed = self.closed.subscribe();
        tokio::select! {
            _ = session.wait_for(|session| session.status == EditStatus::Idle) => {}
            _ = closed.wait_for(|closed| *closed) => {}
        }
    }

    /// Releases the session. In-flight remote calls keep running but their results
    /// are discarded.
    pub fn close(&self) {
        self.state.send_if_modified(|_| {
            self.closed.send_replace(true);
            false
        });
        trace!("edit session closed");
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    fn change_brand_choice(&self, brand: CardBrand) {
        self.state.send_if_modified(|session| {
            if session.chosen_brand == brand {
                return false;
            }
            session.chosen_brand = brand;
            true
        });
    }

    fn request_remove(&self) {
        let Some(started) = self.begin(EditStatus::Removing, |_| true) else {
            return;
        };

        let remover = self.remover.clone();
        let call = tokio::spawn(async move { remover.remove(&started.instrument).await });
        self.observe(call, |session, outcome| {
            if let Err(error) = outcome {
                warn!(id = %session.instrument.id, %error, "remove failed");
                session.error = Some(error_message(&error));
            }
        });
    }

    fn request_update(&self) {
        let Some(started) = self.begin(EditStatus::Updating, EditSession::can_update) else {
            return;
        };

        let updater = self.updater.clone();
        let call = tokio::spawn(async move {
            updater.update(&started.instrument, started.chosen_brand).await
        });
        self.observe(call, |session, outcome| match outcome {
            Ok(updated) => session.instrument = updated,
            Err(error) => {
                warn!(id = %session.instrument.id, %error, "update failed");
                session.error = Some(error_message(&error));
            }
        });
    }

    /// Moves an idle session into `status`, returning the session it started from.
    fn begin(
        &self,
        status: EditStatus,
        allowed: impl FnOnce(&EditSession) -> bool,
    ) -> Option<EditSession> {
        let mut started = None;
        self.state.send_if_modified(|session| {
            if session.status != EditStatus::Idle {
                debug!(
                    in_flight = ?session.status,
                    requested = ?status,
                    "request ignored: operation in flight"
                );
                return false;
            }
            if !allowed(session) {
                debug!(brand = ?session.chosen_brand, "update ignored: brand unchanged");
                return false;
            }
            session.error = None;
            session.status = status;
            started = Some(session.clone());
            true
        });
        started
    }

    fn observe<T, F>(&self, call: JoinHandle<std::result::Result<T, OperationError>>, apply: F)
    where
        T: Send + 'static,
        F: FnOnce(&mut EditSession, std::result::Result<T, OperationError>) + Send + 'static,
    {
        let state = self.state.clone();
        let closed = self.closed.clone();
        let mut closed_rx = closed.subscribe();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = closed_rx.wait_for(|closed| *closed) => {
                    trace!("edit session closed before the operation finished");
                }
                joined = call => {
                    let outcome =
                        joined.unwrap_or_else(|err| Err(OperationError::new(err.to_string())));
                    state.send_if_modified(|session| {
                        if *closed.borrow() {
                            return false;
                        }
                        apply(session, outcome);
                        session.status = EditStatus::Idle;
                        true
                    });
                }
            }
        });
    }
}

fn error_message(error: &OperationError) -> ResolvableString {
    if error.message.trim().is_empty() {
        ResolvableString::resource(StringId::GenericRemoteFailure)
    } else {
        ResolvableString::literal(error.message.clone())
    }
}
