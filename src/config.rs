use crate::domain::amount::Amount;
use crate::domain::payment_option::{DisplayableOption, PaymentMethodCode, SupportedPaymentMethod};
use crate::domain::primary_button::IntentKind;
use crate::domain::strings::{ResolvableString, StringId};
use crate::domain::wallets::WalletPlacement;
use crate::error::Result;
use serde::Deserialize;
use std::io::Read;

/// Merchant-facing configuration of the payment sheet.
///
/// Every field has a default so an empty JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetConfig {
    pub merchant_display_name: String,
    pub primary_button_label: Option<String>,
    pub allows_removal_of_last_saved_payment_method: bool,
    pub wallet_placement: WalletPlacement,
    pub card_brand_choice_eligible: bool,
    pub intent: IntentConfig,
    pub supported_payment_methods: Vec<PaymentMethodCode>,
    pub codes_requiring_interaction: Vec<PaymentMethodCode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum IntentConfig {
    Payment { amount: i64, currency: String },
    Setup,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            merchant_display_name: "Merchant".to_string(),
            primary_button_label: None,
            allows_removal_of_last_saved_payment_method: true,
            wallet_placement: WalletPlacement::Header,
            card_brand_choice_eligible: false,
            intent: IntentConfig::Setup,
            supported_payment_methods: vec![PaymentMethodCode::new(PaymentMethodCode::CARD)],
            codes_requiring_interaction: vec![PaymentMethodCode::new(PaymentMethodCode::CARD)],
        }
    }
}

impl SheetConfig {
    pub fn from_reader<R: Read>(source: R) -> Result<Self> {
        Ok(serde_json::from_reader(source)?)
    }

    pub fn intent_kind(&self) -> IntentKind {
        match self.intent {
            IntentConfig::Payment { .. } => IntentKind::Payment,
            IntentConfig::Setup => IntentKind::Setup,
        }
    }

    pub fn amount(&self) -> Option<Amount> {
        match &self.intent {
            IntentConfig::Payment { amount, currency } => {
                Some(Amount::new(*amount, currency.as_str()))
            }
            IntentConfig::Setup => None,
        }
    }

    /// The non-wallet rows of the option list, in configured order.
    pub fn displayable_options(&self) -> Vec<DisplayableOption> {
        self.supported_payment_methods
            .iter()
            .map(|code| {
                DisplayableOption::PaymentMethod(SupportedPaymentMethod::new(
                    code.clone(),
                    display_name_for(code),
                ))
            })
            .collect()
    }
}

fn display_name_for(code: &PaymentMethodCode) -> ResolvableString {
    match code.as_str() {
        PaymentMethodCode::CARD => ResolvableString::resource(StringId::CardLabel),
        PaymentMethodCode::CASHAPP => ResolvableString::resource(StringId::CashAppLabel),
        PaymentMethodCode::US_BANK_ACCOUNT => {
            ResolvableString::resource(StringId::UsBankAccountLabel)
        }
        PaymentMethodCode::INSTANT_DEBITS => {
            ResolvableString::resource(StringId::InstantDebitsLabel)
        }
        other => ResolvableString::literal(other),
    }
}
