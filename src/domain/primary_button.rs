use super::amount::{Amount, AmountFormatter};
use super::payment_option::PaymentOption;
use super::screen::Screen;
use super::strings::{ResolvableString, StringId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryButtonUiState {
    pub label: ResolvableString,
    pub enabled: bool,
    pub lock_visible: bool,
}

/// Whether the sheet collects a payment or only sets up a payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    #[default]
    Payment,
    Setup,
}

/// Latest values the button state is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryButtonInputs {
    pub screen: Screen,
    pub buttons_enabled: bool,
    pub amount: Option<Amount>,
    pub selection: Option<PaymentOption>,
    /// Replaces the computed state entirely when present.
    pub custom_state: Option<PrimaryButtonUiState>,
    pub cvc_complete: bool,
}

/// Derives the primary button for the full sheet and for the embedded custom flow.
#[derive(Clone)]
pub struct PrimaryButtonStateResolver {
    label_override: Option<String>,
    intent: IntentKind,
    formatter: Arc<dyn AmountFormatter>,
}

impl PrimaryButtonStateResolver {
    pub fn new(
        label_override: Option<String>,
        intent: IntentKind,
        formatter: Arc<dyn AmountFormatter>,
    ) -> Self {
        Self {
            label_override,
            intent,
            formatter,
        }
    }

    /// Buy button: visible only on screens showing it.
    pub fn for_complete_flow(&self, inputs: &PrimaryButtonInputs) -> Option<PrimaryButtonUiState> {
        if let Some(custom) = &inputs.custom_state {
            return Some(custom.clone());
        }
        if !inputs.screen.shows_buy_button() {
            return None;
        }
        let enabled = inputs.buttons_enabled
            && inputs.selection.as_ref().is_some_and(|selection| {
                cvc_complete_or_not_required(&inputs.screen, inputs.cvc_complete, selection)
            });
        Some(PrimaryButtonUiState {
            label: self.buy_button_label(inputs.amount.as_ref()),
            enabled,
            lock_visible: true,
        })
    }

    /// Continue button: visible when the screen offers it or the selection must be confirmed.
    pub fn for_custom_flow(&self, inputs: &PrimaryButtonInputs) -> Option<PrimaryButtonUiState> {
        if let Some(custom) = &inputs.custom_state {
            return Some(custom.clone());
        }
        let confirmation_required = inputs
            .selection
            .as_ref()
            .is_some_and(PaymentOption::requires_confirmation);
        if !inputs.screen.shows_continue_button() && !confirmation_required {
            return None;
        }
        Some(PrimaryButtonUiState {
            label: self.continue_button_label(),
            enabled: inputs.buttons_enabled && inputs.selection.is_some(),
            lock_visible: false,
        })
    }

    fn buy_button_label(&self, amount: Option<&Amount>) -> ResolvableString {
        if let Some(label) = &self.label_override {
            return ResolvableString::literal(label.clone());
        }
        match self.intent {
            IntentKind::Payment => amount
                .map(|amount| amount.build_pay_button_label(self.formatter.as_ref()))
                .unwrap_or_else(|| ResolvableString::resource(StringId::PayButtonLabel)),
            IntentKind::Setup => ResolvableString::resource(StringId::SetupButtonLabel),
        }
    }

    fn continue_button_label(&self) -> ResolvableString {
        match &self.label_override {
            Some(label) => ResolvableString::literal(label.clone()),
            None => ResolvableString::resource(StringId::ContinueButtonLabel),
        }
    }
}

/// CVC only gates the button for saved cards on a screen that recollects it.
fn cvc_complete_or_not_required(
    screen: &Screen,
    cvc_complete: bool,
    selection: &PaymentOption,
) -> bool {
    let saved_card = matches!(
        selection,
        PaymentOption::SavedInstrument(instrument) if instrument.is_card()
    );
    if screen.requires_cvc_recollection() && saved_card {
        cvc_complete
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::amount::DecimalAmountFormatter;
    use crate::domain::payment_option::{
        CardBrand, NewMethod, PaymentMethodCode, SavedInstrument, WalletKind,
    };
    use crate::domain::screen::CvcRecollectionState;
    use crate::domain::strings::EnglishStrings;

    fn resolver(label_override: Option<&str>, intent: IntentKind) -> PrimaryButtonStateResolver {
        PrimaryButtonStateResolver::new(
            label_override.map(str::to_string),
            intent,
            Arc::new(DecimalAmountFormatter),
        )
    }

    fn inputs(screen: Screen, selection: Option<PaymentOption>) -> PrimaryButtonInputs {
        PrimaryButtonInputs {
            screen,
            buttons_enabled: true,
            amount: Some(Amount::new(1099, "USD")),
            selection,
            custom_state: None,
            cvc_complete: false,
        }
    }

    fn saved_card() -> PaymentOption {
        PaymentOption::SavedInstrument(SavedInstrument::card("pm_1", CardBrand::Visa, "4242"))
    }

    fn label(state: &PrimaryButtonUiState) -> String {
        state.label.resolve(&EnglishStrings)
    }

    #[test]
    fn test_complete_flow_pay_label_and_enabled() {
        let state = resolver(None, IntentKind::Payment)
            .for_complete_flow(&inputs(Screen::VerticalMode, Some(saved_card())))
            .unwrap();
        assert_eq!(label(&state), "Pay $10.99");
        assert!(state.enabled);
        assert!(state.lock_visible);
    }

    #[test]
    fn test_complete_flow_labels() {
        let mut no_amount = inputs(Screen::VerticalMode, None);
        no_amount.amount = None;
        let state = resolver(None, IntentKind::Payment).for_complete_flow(&no_amount).unwrap();
        assert_eq!(label(&state), "Pay");
        assert!(!state.enabled);

        let setup = resolver(None, IntentKind::Setup)
            .for_complete_flow(&inputs(Screen::VerticalMode, None))
            .unwrap();
        assert_eq!(label(&setup), "Set up");

        let custom = resolver(Some("Buy it"), IntentKind::Payment)
            .for_complete_flow(&inputs(Screen::VerticalMode, None))
            .unwrap();
        assert_eq!(label(&custom), "Buy it");
    }

    #[test]
    fn test_complete_flow_hidden_off_buy_screens() {
        let resolver = resolver(None, IntentKind::Payment);
        assert!(
            resolver
                .for_complete_flow(&inputs(Screen::ManageSavedPaymentMethods, None))
                .is_none()
        );
        assert!(resolver.for_complete_flow(&inputs(Screen::Loading, Some(saved_card()))).is_none());
    }

    #[test]
    fn test_complete_flow_waits_for_cvc() {
        let resolver = resolver(None, IntentKind::Payment);
        let screen = Screen::SelectSavedPaymentMethods {
            cvc_recollection: CvcRecollectionState::Required,
        };
        let mut pending = inputs(screen.clone(), Some(saved_card()));
        assert!(!resolver.for_complete_flow(&pending).unwrap().enabled);

        pending.cvc_complete = true;
        assert!(resolver.for_complete_flow(&pending).unwrap().enabled);

        let wallet = inputs(screen, Some(PaymentOption::wallet(WalletKind::QuickPay)));
        assert!(resolver.for_complete_flow(&wallet).unwrap().enabled);
    }

    #[test]
    fn test_complete_flow_respects_buttons_enabled() {
        let mut disabled = inputs(Screen::VerticalMode, Some(saved_card()));
        disabled.buttons_enabled = false;
        assert!(!resolver(None, IntentKind::Payment).for_complete_flow(&disabled).unwrap().enabled);
    }

    #[test]
    fn test_custom_flow_continue_button() {
        let resolver = resolver(None, IntentKind::Payment);
        assert!(
            resolver
                .for_custom_flow(&inputs(Screen::VerticalMode, Some(saved_card())))
                .is_none()
        );

        let form = Screen::Form {
            code: PaymentMethodCode::new("card"),
        };
        let state = resolver.for_custom_flow(&inputs(form, Some(saved_card()))).unwrap();
        assert_eq!(label(&state), "Continue");
        assert!(state.enabled);
        assert!(!state.lock_visible);
    }

    #[test]
    fn test_custom_flow_visible_for_confirmation() {
        let mut bank = NewMethod::new(PaymentMethodCode::US_BANK_ACCOUNT);
        bank.requires_confirmation = true;
        let state = resolver(Some("Confirm"), IntentKind::Setup)
            .for_custom_flow(&inputs(Screen::VerticalMode, Some(PaymentOption::NewMethod(bank))))
            .unwrap();
        assert_eq!(label(&state), "Confirm");
    }

    #[test]
    fn test_custom_state_overrides_everything() {
        let custom = PrimaryButtonUiState {
            label: ResolvableString::literal("Processing"),
            enabled: false,
            lock_visible: false,
        };
        let mut overridden = inputs(Screen::Loading, None);
        overridden.custom_state = Some(custom.clone());
        let resolver = resolver(None, IntentKind::Payment);
        assert_eq!(resolver.for_complete_flow(&overridden), Some(custom.clone()));
        assert_eq!(resolver.for_custom_flow(&overridden), Some(custom));
    }
}
