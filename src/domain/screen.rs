use super::payment_option::PaymentMethodCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CvcRecollectionState {
    #[default]
    NotRequired,
    Required,
}

/// Navigation screens of the payment sheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    Loading,
    VerticalMode,
    Form {
        code: PaymentMethodCode,
    },
    SelectSavedPaymentMethods {
        #[serde(default)]
        cvc_recollection: CvcRecollectionState,
    },
    AddFirstPaymentMethod,
    AddAnotherPaymentMethod,
    ManageSavedPaymentMethods,
    ManageOneSavedPaymentMethod,
    EditPaymentMethod,
}

impl Screen {
    pub fn shows_buy_button(&self) -> bool {
        match self {
            Self::VerticalMode
            | Self::Form { .. }
            | Self::SelectSavedPaymentMethods { .. }
            | Self::AddFirstPaymentMethod
            | Self::AddAnotherPaymentMethod => true,
            Self::Loading
            | Self::ManageSavedPaymentMethods
            | Self::ManageOneSavedPaymentMethod
            | Self::EditPaymentMethod => false,
        }
    }

    pub fn shows_continue_button(&self) -> bool {
        match self {
            Self::Form { .. } | Self::AddFirstPaymentMethod | Self::AddAnotherPaymentMethod => true,
            Self::Loading
            | Self::VerticalMode
            | Self::SelectSavedPaymentMethods { .. }
            | Self::ManageSavedPaymentMethods
            | Self::ManageOneSavedPaymentMethod
            | Self::EditPaymentMethod => false,
        }
    }

    pub fn requires_cvc_recollection(&self) -> bool {
        matches!(
            self,
            Self::SelectSavedPaymentMethods {
                cvc_recollection: CvcRecollectionState::Required
            }
        )
    }
}
