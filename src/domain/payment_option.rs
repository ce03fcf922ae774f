use super::strings::ResolvableString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Payment method type code, e.g. `card` or `cashapp`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentMethodCode(String);

impl PaymentMethodCode {
    pub const CARD: &'static str = "card";
    pub const CASHAPP: &'static str = "cashapp";
    pub const US_BANK_ACCOUNT: &'static str = "us_bank_account";
    pub const INSTANT_DEBITS: &'static str = "instant_debits";

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_card(&self) -> bool {
        self.0 == Self::CARD
    }
}

impl fmt::Display for PaymentMethodCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PaymentMethodCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for PaymentMethodCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    Visa,
    Mastercard,
    AmericanExpress,
    Discover,
    Jcb,
    DinersClub,
    UnionPay,
    CartesBancaires,
    #[default]
    Unknown,
}

impl CardBrand {
    /// Maps a network code to a brand. Unrecognized codes map to `Unknown`.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "visa" => Self::Visa,
            "mastercard" => Self::Mastercard,
            "amex" | "american_express" => Self::AmericanExpress,
            "discover" => Self::Discover,
            "jcb" => Self::Jcb,
            "diners" | "diners_club" => Self::DinersClub,
            "unionpay" => Self::UnionPay,
            "cartes_bancaires" => Self::CartesBancaires,
            _ => Self::Unknown,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::Mastercard => "mastercard",
            Self::AmericanExpress => "amex",
            Self::Discover => "discover",
            Self::Jcb => "jcb",
            Self::DinersClub => "diners",
            Self::UnionPay => "unionpay",
            Self::CartesBancaires => "cartes_bancaires",
            Self::Unknown => "unknown",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Visa => "Visa",
            Self::Mastercard => "Mastercard",
            Self::AmericanExpress => "American Express",
            Self::Discover => "Discover",
            Self::Jcb => "JCB",
            Self::DinersClub => "Diners Club",
            Self::UnionPay => "UnionPay",
            Self::CartesBancaires => "Cartes Bancaires",
            Self::Unknown => "Unknown",
        }
    }
}

/// Networks a co-branded card can be charged on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct CardNetworks {
    pub available: Vec<CardBrand>,
    pub preferred: Option<CardBrand>,
}

/// A previously stored, reusable payment method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SavedInstrument {
    pub id: String,
    pub method_type: PaymentMethodCode,
    pub brand: CardBrand,
    pub last4: Option<String>,
    pub networks: Option<CardNetworks>,
}

impl SavedInstrument {
    pub fn card(id: impl Into<String>, brand: CardBrand, last4: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            method_type: PaymentMethodCode::new(PaymentMethodCode::CARD),
            brand,
            last4: Some(last4.into()),
            networks: None,
        }
    }

    pub fn with_networks(
        mut self,
        available: Vec<CardBrand>,
        preferred: Option<CardBrand>,
    ) -> Self {
        self.networks = Some(CardNetworks {
            available,
            preferred,
        });
        self
    }

    pub fn is_card(&self) -> bool {
        self.method_type.is_card()
    }

    /// The brand the customer picked for this card, or `Unknown` when none was saved.
    pub fn preferred_brand(&self) -> CardBrand {
        self.networks
            .as_ref()
            .and_then(|networks| networks.preferred)
            .unwrap_or(CardBrand::Unknown)
    }

    pub fn available_brands(&self) -> Vec<CardBrand> {
        self.networks
            .as_ref()
            .map(|networks| networks.available.clone())
            .unwrap_or_default()
    }

    /// True when the card can be charged on more than one network.
    pub fn has_brand_choice(&self) -> bool {
        self.is_card()
            && self
                .networks
                .as_ref()
                .is_some_and(|networks| networks.available.len() > 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CustomerRequestedSave {
    RequestReuse,
    RequestNoReuse,
    #[default]
    NoRequest,
}

/// Values the customer typed into a payment method form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct FormValues {
    pub field_values: BTreeMap<String, String>,
    pub user_requested_reuse: CustomerRequestedSave,
}

/// A payment method that has not been saved yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewMethod {
    pub code: PaymentMethodCode,
    pub form_values: FormValues,
    /// The selection has to be explicitly confirmed by the customer before use.
    pub requires_confirmation: bool,
}

impl NewMethod {
    pub fn new(code: impl Into<PaymentMethodCode>) -> Self {
        Self {
            code: code.into(),
            form_values: FormValues::default(),
            requires_confirmation: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    QuickPay,
    DeferredPay,
}

impl WalletKind {
    pub const ALL: [WalletKind; 2] = [WalletKind::QuickPay, WalletKind::DeferredPay];

    pub fn code(&self) -> PaymentMethodCode {
        match self {
            Self::QuickPay => PaymentMethodCode::new("quick_pay"),
            Self::DeferredPay => PaymentMethodCode::new("deferred_pay"),
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.code().as_str() == code)
    }
}

/// Anything the customer can have selected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentOption {
    SavedInstrument(SavedInstrument),
    NewMethod(NewMethod),
    Wallet { wallet: WalletKind },
}

impl PaymentOption {
    pub fn wallet(kind: WalletKind) -> Self {
        Self::Wallet { wallet: kind }
    }

    pub fn code(&self) -> PaymentMethodCode {
        match self {
            Self::SavedInstrument(instrument) => instrument.method_type.clone(),
            Self::NewMethod(new) => new.code.clone(),
            Self::Wallet { wallet } => wallet.code(),
        }
    }

    pub fn requires_confirmation(&self) -> bool {
        match self {
            Self::NewMethod(new) => new.requires_confirmation,
            Self::SavedInstrument(_) | Self::Wallet { .. } => false,
        }
    }
}

/// A payment method type the merchant accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedPaymentMethod {
    pub code: PaymentMethodCode,
    pub display_name: ResolvableString,
    pub subtitle: Option<ResolvableString>,
}

impl SupportedPaymentMethod {
    pub fn new(code: impl Into<PaymentMethodCode>, display_name: ResolvableString) -> Self {
        Self {
            code: code.into(),
            display_name,
            subtitle: None,
        }
    }
}

/// One row of the selectable option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayableOption {
    PaymentMethod(SupportedPaymentMethod),
    Wallet { wallet: WalletKind },
}

impl DisplayableOption {
    pub fn code(&self) -> PaymentMethodCode {
        match self {
            Self::PaymentMethod(method) => method.code.clone(),
            Self::Wallet { wallet } => wallet.code(),
        }
    }

    pub fn is_wallet(&self) -> bool {
        matches!(self, Self::Wallet { .. })
    }
}

/// A saved instrument as presented to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayableSavedInstrument {
    pub instrument: SavedInstrument,
    pub display_name: ResolvableString,
    pub is_modifiable: bool,
}
