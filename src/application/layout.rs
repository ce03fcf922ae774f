use super::aggregator::{InputValues, LayoutSettings, StateAggregator, UiSnapshot};
use super::driver::{self, DriverHandle, Reactive, next_change};
use crate::domain::payment_option::{
    DisplayableSavedInstrument, FormValues, PaymentMethodCode, PaymentOption, SavedInstrument,
    WalletKind,
};
use crate::domain::ports::{FormFieldLookupRef, PaymentSheetHostRef};
use crate::domain::screen::Screen;
use crate::domain::selection::requires_form_screen;
use crate::domain::wallets::WalletsState;
use crate::error::{PaymentSheetError, Result};
use tokio::sync::watch;
use tracing::{debug, trace};

/// Upstream signals observed by the vertical layout. Each has exactly one writer
/// outside this crate's interactors.
pub struct LayoutInputs {
    pub instruments: watch::Receiver<Option<Vec<SavedInstrument>>>,
    pub most_recently_used: watch::Receiver<Option<SavedInstrument>>,
    pub selection: watch::Receiver<Option<PaymentOption>>,
    pub wallets: watch::Receiver<Option<WalletsState>>,
    pub processing: watch::Receiver<bool>,
    pub editing: watch::Receiver<bool>,
    pub is_current_screen: watch::Receiver<bool>,
}

impl LayoutInputs {
    fn latest(&mut self) -> InputValues {
        InputValues {
            instruments: self.instruments.borrow_and_update().clone(),
            most_recently_used: self.most_recently_used.borrow_and_update().clone(),
            selection: self.selection.borrow_and_update().clone(),
            wallets: *self.wallets.borrow_and_update(),
            processing: *self.processing.borrow_and_update(),
            editing: *self.editing.borrow_and_update(),
        }
    }

    async fn any_changed(&mut self) {
        tokio::select! {
            _ = next_change(&mut self.instruments) => {}
            _ = next_change(&mut self.most_recently_used) => {}
            _ = next_change(&mut self.selection) => {}
            _ = next_change(&mut self.wallets) => {}
            _ = next_change(&mut self.processing) => {}
            _ = next_change(&mut self.editing) => {}
            _ = next_change(&mut self.is_current_screen) => {}
        }
    }
}

/// User intents raised by the vertical layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    SelectPaymentMethod(PaymentMethodCode),
    DeletePaymentMethod(SavedInstrument),
    EditPaymentMethod(DisplayableSavedInstrument),
    AddCardPressed,
    TransitionToManage,
    TransitionToManageOne,
    SavedInstrumentSelected(SavedInstrument),
}

struct LayoutReactor {
    aggregator: StateAggregator,
    inputs: LayoutInputs,
    host: PaymentSheetHostRef,
    snapshots: watch::Sender<UiSnapshot>,
    selection: watch::Sender<Option<PaymentOption>>,
    wallets_header: watch::Sender<bool>,
    was_current_screen: bool,
}

impl LayoutReactor {
    fn publish(&self, next: UiSnapshot) {
        let selection = next.selection.clone();
        let shows_header = next.shows_wallets_header;

        self.snapshots.send_if_modified(|current| replace_if_changed(current, next));
        self.selection.send_if_modified(|current| replace_if_changed(current, selection));
        self.wallets_header.send_if_modified(|current| replace_if_changed(current, shows_header));
    }

    fn commit_on_activation(&mut self) {
        let is_current = *self.inputs.is_current_screen.borrow_and_update();
        if is_current && !self.was_current_screen {
            let selection = self.aggregator.resolved_selection();
            trace!(
                selection = ?selection.as_ref().map(PaymentOption::code),
                "committing selection"
            );
            self.host.update_selection(selection);
        }
        self.was_current_screen = is_current;
    }
}

impl Reactive for LayoutReactor {
    const NAME: &'static str = "vertical_layout";

    async fn input_changed(&mut self) {
        self.inputs.any_changed().await
    }

    fn refresh(&mut self) {
        let values = self.inputs.latest();
        self.aggregator.apply(values);
        self.publish(self.aggregator.snapshot());
        self.commit_on_activation();
    }
}

fn replace_if_changed<T: PartialEq>(current: &mut T, next: T) -> bool {
    if *current == next {
        false
    } else {
        *current = next;
        true
    }
}

/// Drives the vertical payment method list.
///
/// Snapshots are recomputed on a background task whenever any input changes and
/// are published only when they differ from the previous one. Must be created
/// inside a Tokio runtime.
pub struct VerticalLayoutInteractor {
    snapshots: watch::Receiver<UiSnapshot>,
    selection: watch::Receiver<Option<PaymentOption>>,
    wallets_header: watch::Receiver<bool>,
    lookup: FormFieldLookupRef,
    host: PaymentSheetHostRef,
    driver: DriverHandle,
}

impl VerticalLayoutInteractor {
    pub fn new(
        settings: LayoutSettings,
        mut inputs: LayoutInputs,
        lookup: FormFieldLookupRef,
        host: PaymentSheetHostRef,
    ) -> Self {
        let aggregator = StateAggregator::new(settings, lookup.clone(), inputs.latest());
        let initial = aggregator.snapshot();

        let (snapshot_tx, snapshots) = watch::channel(initial.clone());
        let (selection_tx, selection) = watch::channel(initial.selection.clone());
        let (wallets_header_tx, wallets_header) = watch::channel(initial.shows_wallets_header);

        let driver = driver::spawn_driver(LayoutReactor {
            aggregator,
            inputs,
            host: host.clone(),
            snapshots: snapshot_tx,
            selection: selection_tx,
            wallets_header: wallets_header_tx,
            was_current_screen: false,
        });

        Self {
            snapshots,
            selection,
            wallets_header,
            lookup,
            host,
            driver,
        }
    }

    /// Latest published snapshot.
    pub fn state(&self) -> UiSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UiSnapshot> {
        self.snapshots.clone()
    }

    /// Resolved selection, for sibling interactors.
    pub fn selection(&self) -> watch::Receiver<Option<PaymentOption>> {
        self.selection.clone()
    }

    pub fn shows_wallets_header(&self) -> watch::Receiver<bool> {
        self.wallets_header.clone()
    }

    /// Waits until every input change made before the call is reflected in
    /// [`state`](Self::state).
    pub async fn flush(&self) -> Result<()> {
        self.driver.flush().await
    }

    pub fn handle_view_action(&self, action: ViewAction) -> Result<()> {
        if self.driver.is_closed() {
            return Err(PaymentSheetError::InteractorClosed);
        }
        debug!(?action, "layout view action");

        match action {
            ViewAction::SelectPaymentMethod(code) => self.select_payment_method(code),
            ViewAction::DeletePaymentMethod(instrument) => {
                self.host.on_delete_payment_method(instrument)
            }
            ViewAction::EditPaymentMethod(instrument) => {
                self.host.on_edit_payment_method(instrument)
            }
            ViewAction::AddCardPressed => self.host.on_add_card_pressed(),
            ViewAction::TransitionToManage => {
                self.host.transition_to(Screen::ManageSavedPaymentMethods)
            }
            ViewAction::TransitionToManageOne => {
                self.host.transition_to(Screen::ManageOneSavedPaymentMethod)
            }
            ViewAction::SavedInstrumentSelected(instrument) => {
                self.host.on_select_saved_payment_method(instrument)
            }
        }
        Ok(())
    }

    fn select_payment_method(&self, code: PaymentMethodCode) {
        if let Some(wallet) = WalletKind::from_code(code.as_str()) {
            self.host.update_selection(Some(PaymentOption::wallet(wallet)));
        } else if requires_form_screen(self.lookup.as_ref(), &code) {
            self.host.transition_to(Screen::Form { code });
        } else {
            self.host.on_form_field_values_changed(FormValues::default(), code);
        }
    }

    /// Stops recomputation. Inputs changed afterwards are no longer observed and
    /// no further snapshot or commit is emitted.
    pub fn close(&self) {
        self.driver.close();
    }

    pub fn is_closed(&self) -> bool {
        self.driver.is_closed()
    }
}
