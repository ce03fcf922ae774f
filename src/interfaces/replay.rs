use super::csv::event_reader::{ScenarioEvent, ViewActionRequest};
use crate::application::aggregator::{LayoutSettings, UiSnapshot};
use crate::application::edit_session::{EditSessionInteractor, EditStatus, EditViewAction};
use crate::application::layout::{LayoutInputs, VerticalLayoutInteractor, ViewAction};
use crate::application::primary_button::{ButtonFlow, PrimaryButtonInteractor, PrimaryButtonSources};
use crate::config::SheetConfig;
use crate::domain::amount::{Amount, DecimalAmountFormatter};
use crate::domain::catalog::SavedInstrumentCatalog;
use crate::domain::payment_option::{CardBrand, NewMethod, PaymentOption, SavedInstrument};
use crate::domain::ports::{FormFieldLookupRef, PaymentSheetHostRef};
use crate::domain::primary_button::{PrimaryButtonStateResolver, PrimaryButtonUiState};
use crate::domain::screen::Screen;
use crate::domain::strings::EnglishStrings;
use crate::domain::wallets::{WalletPlacement, WalletsState};
use crate::error::{OperationError, PaymentSheetError, Result};
use crate::infrastructure::in_memory::{InMemoryInstrumentRepository, StaticFormFieldLookup};
use crate::infrastructure::sheet_flow::{HostCall, InMemorySheetFlow};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::info;

/// Primary button with its label resolved to English.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonOutput {
    pub label: String,
    pub enabled: bool,
    pub lock_visible: bool,
}

impl From<PrimaryButtonUiState> for ButtonOutput {
    fn from(state: PrimaryButtonUiState) -> Self {
        Self {
            label: state.label.resolve(&EnglishStrings),
            enabled: state.enabled,
            lock_visible: state.lock_visible,
        }
    }
}

/// Final state of an edit session opened by a `remove` or `update_brand` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditOutput {
    pub id: String,
    pub status: EditStatus,
    pub selected_brand: CardBrand,
    pub preferred_brand: CardBrand,
    pub can_update: bool,
    pub error: Option<String>,
}

/// Everything observable after one scenario step.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayRecord {
    pub step: usize,
    pub event: &'static str,
    pub snapshot: UiSnapshot,
    pub primary_button: Option<ButtonOutput>,
    pub host_calls: Vec<HostCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit: Option<EditOutput>,
}

/// Upstream signals the scenario writes directly.
struct Signals {
    most_recent: watch::Sender<Option<SavedInstrument>>,
    wallets: watch::Sender<Option<WalletsState>>,
    processing: watch::Sender<bool>,
    editing: watch::Sender<bool>,
    buttons_enabled: watch::Sender<bool>,
    custom_state: watch::Sender<Option<PrimaryButtonUiState>>,
    cvc_complete: watch::Sender<bool>,
    _amount: watch::Sender<Option<Amount>>,
}

/// Drives the real interactors from scenario events.
///
/// The sheet starts on the vertical layout with the given saved instruments
/// already loaded.
pub struct ReplaySession {
    config: SheetConfig,
    repository: InMemoryInstrumentRepository,
    flow: Arc<InMemorySheetFlow>,
    host_calls: mpsc::UnboundedReceiver<HostCall>,
    layout: VerticalLayoutInteractor,
    button: PrimaryButtonInteractor,
    signals: Signals,
    step: usize,
}

impl ReplaySession {
    /// Must be called inside a Tokio runtime.
    pub fn new(config: SheetConfig, instruments: Vec<SavedInstrument>) -> Self {
        let repository = InMemoryInstrumentRepository::with_instruments(instruments);
        let (flow, host_calls) = InMemorySheetFlow::new(Screen::VerticalMode);
        let flow = Arc::new(flow);
        let host: PaymentSheetHostRef = flow.clone();
        let lookup: FormFieldLookupRef = Arc::new(StaticFormFieldLookup::new(
            config.codes_requiring_interaction.iter().cloned(),
        ));

        let (most_recent, most_recent_rx) = watch::channel(None);
        let (wallets, wallets_rx) = watch::channel(None);
        let (processing, processing_rx) = watch::channel(false);
        let (editing, editing_rx) = watch::channel(false);
        let (buttons_enabled, buttons_enabled_rx) = watch::channel(true);
        let (custom_state, custom_state_rx) = watch::channel(None);
        let (cvc_complete, cvc_complete_rx) = watch::channel(false);
        let (amount, amount_rx) = watch::channel(config.amount());

        let layout = VerticalLayoutInteractor::new(
            LayoutSettings {
                options: config.displayable_options(),
                wallet_placement: config.wallet_placement,
                allows_removal_of_last: config.allows_removal_of_last_saved_payment_method,
                card_brand_choice_eligible: config.card_brand_choice_eligible,
            },
            LayoutInputs {
                instruments: repository.subscribe(),
                most_recently_used: most_recent_rx,
                selection: flow.selection(),
                wallets: wallets_rx,
                processing: processing_rx,
                editing: editing_rx,
                is_current_screen: flow.vertical_mode_current(),
            },
            lookup,
            host,
        );

        // The embedded flow controller renders wallets inline and shows a continue button.
        let button_flow = match config.wallet_placement {
            WalletPlacement::Header => ButtonFlow::Complete,
            WalletPlacement::Inline => ButtonFlow::Custom,
        };
        let button = PrimaryButtonInteractor::new(
            button_flow,
            PrimaryButtonStateResolver::new(
                config.primary_button_label.clone(),
                config.intent_kind(),
                Arc::new(DecimalAmountFormatter),
            ),
            PrimaryButtonSources {
                screen: flow.screen(),
                buttons_enabled: buttons_enabled_rx,
                amount: amount_rx,
                selection: layout.selection(),
                custom_state: custom_state_rx,
                cvc_complete: cvc_complete_rx,
            },
        );

        Self {
            config,
            repository,
            flow,
            host_calls,
            layout,
            button,
            signals: Signals {
                most_recent,
                wallets,
                processing,
                editing,
                buttons_enabled,
                custom_state,
                cvc_complete,
                _amount: amount,
            },
            step: 0,
        }
    }

    /// Record of the state before any event, including the commit made when the
    /// layout first becomes the current screen.
    pub async fn start(&mut self) -> Result<ReplayRecord> {
        info!(merchant = %self.config.merchant_display_name, "replay started");
        self.settle().await?;
        Ok(self.record("start", None))
    }

    pub async fn apply(&mut self, event: ScenarioEvent) -> Result<ReplayRecord> {
        let name = event.name();
        let mut edit = None;

        match event {
            ScenarioEvent::SelectSaved(id) => {
                let instrument = self.instrument(&id)?;
                self.flow
                    .set_selection(Some(PaymentOption::SavedInstrument(instrument)));
            }
            ScenarioEvent::SelectNew(code) => {
                self.flow
                    .set_selection(Some(PaymentOption::NewMethod(NewMethod::new(code))));
            }
            ScenarioEvent::SelectWallet(wallet) => {
                self.flow.set_selection(Some(PaymentOption::wallet(wallet)));
            }
            ScenarioEvent::ClearSelection => self.flow.set_selection(None),
            ScenarioEvent::Wallets(state) => {
                self.signals.wallets.send_replace(state);
            }
            ScenarioEvent::Processing(processing) => {
                self.signals.processing.send_replace(processing);
            }
            ScenarioEvent::Editing(editing) => {
                self.signals.editing.send_replace(editing);
            }
            ScenarioEvent::Screen(screen) => self.flow.navigate(screen),
            ScenarioEvent::MostRecent(id) => {
                let instrument = id.map(|id| self.instrument(&id)).transpose()?;
                self.signals.most_recent.send_replace(instrument);
            }
            ScenarioEvent::ViewAction(request) => {
                let action = self.view_action(request)?;
                self.layout.handle_view_action(action)?;
            }
            ScenarioEvent::Remove(id) => {
                edit = Some(self.edit(&id, &[EditViewAction::OnRemovePressed]).await?);
            }
            ScenarioEvent::UpdateBrand { id, brand } => {
                let actions = [
                    EditViewAction::OnBrandChoiceChanged(brand),
                    EditViewAction::OnUpdatePressed,
                ];
                edit = Some(self.edit(&id, &actions).await?);
            }
            ScenarioEvent::ButtonsEnabled(enabled) => {
                self.signals.buttons_enabled.send_replace(enabled);
            }
            ScenarioEvent::CvcComplete(complete) => {
                self.signals.cvc_complete.send_replace(complete);
            }
            ScenarioEvent::FailNext(message) => {
                self.repository
                    .fail_next_operation(OperationError::new(message))
                    .await;
            }
        }

        self.settle().await?;
        Ok(self.record(name, edit))
    }

    /// Replaces the computed primary button, or restores it with `None`.
    pub fn set_custom_primary_button(&self, state: Option<PrimaryButtonUiState>) {
        self.signals.custom_state.send_replace(state);
    }

    pub fn close(&self) {
        self.layout.close();
        self.button.close();
        info!(steps = self.step, "replay finished");
    }

    fn instrument(&self, id: &str) -> Result<SavedInstrument> {
        self.repository.find(id).ok_or_else(|| {
            PaymentSheetError::InvalidEvent(format!("unknown payment method '{id}'"))
        })
    }

    fn view_action(&self, request: ViewActionRequest) -> Result<ViewAction> {
        let action = match request {
            ViewActionRequest::SelectPaymentMethod(code) => ViewAction::SelectPaymentMethod(code),
            ViewActionRequest::DeletePaymentMethod(id) => {
                ViewAction::DeletePaymentMethod(self.instrument(&id)?)
            }
            ViewActionRequest::EditPaymentMethod(id) => {
                let catalog = SavedInstrumentCatalog::new(
                    self.config.allows_removal_of_last_saved_payment_method,
                    self.config.card_brand_choice_eligible,
                );
                ViewAction::EditPaymentMethod(catalog.to_displayable(&self.instrument(&id)?))
            }
            ViewActionRequest::AddCardPressed => ViewAction::AddCardPressed,
            ViewActionRequest::TransitionToManage => ViewAction::TransitionToManage,
            ViewActionRequest::TransitionToManageOne => ViewAction::TransitionToManageOne,
            ViewActionRequest::SavedInstrumentSelected(id) => {
                ViewAction::SavedInstrumentSelected(self.instrument(&id)?)
            }
        };
        Ok(action)
    }

    /// Runs one edit session to completion and closes it.
    async fn edit(&self, id: &str, actions: &[EditViewAction]) -> Result<EditOutput> {
        let instrument = self.instrument(id)?;
        let session = EditSessionInteractor::new(
            instrument,
            Arc::new(self.repository.clone()),
            Arc::new(self.repository.clone()),
        )?;

        let was_editing = self.signals.editing.send_replace(true);
        for action in actions {
            session.handle_view_action(*action)?;
        }
        session.idle().await;
        let outcome = session.session();
        session.close();
        self.signals.editing.send_replace(was_editing);

        let view = outcome.view_state();
        Ok(EditOutput {
            id: outcome.instrument.id.clone(),
            status: view.status,
            selected_brand: view.selected_brand,
            preferred_brand: outcome.instrument.preferred_brand(),
            can_update: view.can_update,
            error: view.error.map(|error| error.resolve(&EnglishStrings)),
        })
    }

    /// A commit on screen activation writes the raw selection, which the layout
    /// then has to read back, so two passes are needed to reach a fixed point.
    async fn settle(&self) -> Result<()> {
        for _ in 0..2 {
            self.layout.flush().await?;
            self.button.flush().await?;
        }
        Ok(())
    }

    fn record(&mut self, event: &'static str, edit: Option<EditOutput>) -> ReplayRecord {
        let host_calls = std::iter::from_fn(|| self.host_calls.try_recv().ok()).collect();
        let record = ReplayRecord {
            step: self.step,
            event,
            snapshot: self.layout.state(),
            primary_button: self.button.state().map(ButtonOutput::from),
            host_calls,
            edit,
        };
        self.step += 1;
        record
    }
}
