use crate::domain::payment_option::{
    DisplayableSavedInstrument, FormValues, NewMethod, PaymentMethodCode, PaymentOption,
    SavedInstrument,
};
use crate::domain::ports::PaymentSheetHost;
use crate::domain::screen::Screen;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::trace;

/// A callback the layout made into the enclosing flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum HostCall {
    TransitionTo { screen: Screen },
    UpdateSelection { selection: Option<PaymentOption> },
    FormFieldValuesChanged { code: PaymentMethodCode },
    SelectSavedPaymentMethod { id: String },
    EditPaymentMethod { id: String },
    DeletePaymentMethod { id: String },
    AddCardPressed,
}

/// The enclosing payment sheet, kept in memory.
///
/// Owns the navigation screen and the raw selection, the two signals the layout
/// only reads. Every callback is also reported on the call channel.
pub struct InMemorySheetFlow {
    screen: watch::Sender<Screen>,
    vertical_mode_current: watch::Sender<bool>,
    selection: watch::Sender<Option<PaymentOption>>,
    calls: mpsc::UnboundedSender<HostCall>,
}

impl InMemorySheetFlow {
    pub fn new(initial: Screen) -> (Self, mpsc::UnboundedReceiver<HostCall>) {
        let (calls, call_rx) = mpsc::unbounded_channel();
        let flow = Self {
            vertical_mode_current: watch::channel(initial == Screen::VerticalMode).0,
            screen: watch::channel(initial).0,
            selection: watch::channel(None).0,
            calls,
        };
        (flow, call_rx)
    }

    pub fn screen(&self) -> watch::Receiver<Screen> {
        self.screen.subscribe()
    }

    /// True while the vertical layout is the foreground screen.
    pub fn vertical_mode_current(&self) -> watch::Receiver<bool> {
        self.vertical_mode_current.subscribe()
    }

    pub fn selection(&self) -> watch::Receiver<Option<PaymentOption>> {
        self.selection.subscribe()
    }

    /// Sets the raw selection without recording a host call.
    pub fn set_selection(&self, selection: Option<PaymentOption>) {
        self.selection.send_replace(selection);
    }

    fn record(&self, call: HostCall) {
        trace!(?call, "host call");
        // Dropped once the receiver is gone.
        let _ = self.calls.send(call);
    }

    /// Moves to `screen` without recording a host call.
    pub fn navigate(&self, screen: Screen) {
        let is_vertical = screen == Screen::VerticalMode;
        self.screen.send_replace(screen);
        self.vertical_mode_current.send_if_modified(|current| {
            let changed = *current != is_vertical;
            *current = is_vertical;
            changed
        });
    }
}

impl PaymentSheetHost for InMemorySheetFlow {
    fn transition_to(&self, screen: Screen) {
        self.record(HostCall::TransitionTo {
            screen: screen.clone(),
        });
        self.navigate(screen);
    }

    fn update_selection(&self, selection: Option<PaymentOption>) {
        self.record(HostCall::UpdateSelection {
            selection: selection.clone(),
        });
        self.set_selection(selection);
    }

    fn on_form_field_values_changed(&self, values: FormValues, code: PaymentMethodCode) {
        self.record(HostCall::FormFieldValuesChanged { code: code.clone() });
        let mut method = NewMethod::new(code);
        method.form_values = values;
        self.set_selection(Some(PaymentOption::NewMethod(method)));
    }

    fn on_select_saved_payment_method(&self, instrument: SavedInstrument) {
        self.record(HostCall::SelectSavedPaymentMethod {
            id: instrument.id.clone(),
        });
        self.set_selection(Some(PaymentOption::SavedInstrument(instrument)));
    }

    fn on_edit_payment_method(&self, instrument: DisplayableSavedInstrument) {
        self.record(HostCall::EditPaymentMethod {
            id: instrument.instrument.id,
        });
        self.navigate(Screen::EditPaymentMethod);
    }

    fn on_delete_payment_method(&self, instrument: SavedInstrument) {
        self.record(HostCall::DeletePaymentMethod { id: instrument.id });
    }

    fn on_add_card_pressed(&self) {
        self.record(HostCall::AddCardPressed);
        self.navigate(Screen::AddAnotherPaymentMethod);
    }
}
