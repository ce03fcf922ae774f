use super::strings::{ResolvableString, StringId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Amount to charge, in the currency's minor unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    pub value: i64,
    pub currency_code: String,
}

impl Amount {
    pub fn new(value: i64, currency_code: impl Into<String>) -> Self {
        Self {
            value,
            currency_code: currency_code.into().to_ascii_uppercase(),
        }
    }

    /// Builds the "Pay {formatted amount}" label.
    pub fn build_pay_button_label(&self, formatter: &dyn AmountFormatter) -> ResolvableString {
        ResolvableString::resource_with_args(
            StringId::PayButtonAmount,
            vec![formatter.format(self)],
        )
    }
}

pub trait AmountFormatter: Send + Sync {
    fn format(&self, amount: &Amount) -> String;
}

/// Formats minor units as a decimal using the ISO 4217 exponent of the currency.
#[derive(Debug, Default, Clone, Copy)]
pub struct DecimalAmountFormatter;

impl DecimalAmountFormatter {
    pub fn to_decimal(amount: &Amount) -> Decimal {
        Decimal::new(amount.value, currency_exponent(&amount.currency_code))
    }
}

impl AmountFormatter for DecimalAmountFormatter {
    fn format(&self, amount: &Amount) -> String {
        let value = Self::to_decimal(amount);
        match currency_symbol(&amount.currency_code) {
            Some(symbol) if value.is_sign_negative() => format!("-{symbol}{}", value.abs()),
            Some(symbol) => format!("{symbol}{value}"),
            None => format!("{value} {}", amount.currency_code),
        }
    }
}

fn currency_exponent(currency_code: &str) -> u32 {
    match currency_code {
        "BIF" | "CLP" | "DJF" | "GNF" | "JPY" | "KMF" | "KRW" | "MGA" | "PYG" | "RWF"
        | "UGX" | "VND" | "VUV" | "XAF" | "XOF" | "XPF" => 0,
        "BHD" | "JOD" | "KWD" | "OMR" | "TND" => 3,
        _ => 2,
    }
}

fn currency_symbol(currency_code: &str) -> Option<&'static str> {
    match currency_code {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        _ => None,
    }
}
