use super::payment_option::{
    CardBrand, DisplayableSavedInstrument, FormValues, PaymentMethodCode, PaymentOption,
    SavedInstrument,
};
use super::screen::Screen;
use crate::error::OperationError;
use async_trait::async_trait;
use std::sync::Arc;

/// Remote operation that detaches a saved instrument from the customer.
#[async_trait]
pub trait PaymentMethodRemover: Send + Sync {
    async fn remove(&self, instrument: &SavedInstrument) -> Result<(), OperationError>;
}

/// Remote operation that changes the preferred network of a saved card.
#[async_trait]
pub trait PaymentMethodUpdater: Send + Sync {
    async fn update(
        &self,
        instrument: &SavedInstrument,
        brand: CardBrand,
    ) -> Result<SavedInstrument, OperationError>;
}

/// Answers whether the form for a payment method has fields the customer must fill in.
pub trait FormFieldLookup: Send + Sync {
    fn requires_user_interaction(&self, code: &PaymentMethodCode) -> bool;
}

/// The enclosing sheet flow, which owns navigation and the upstream selection.
pub trait PaymentSheetHost: Send + Sync {
    fn transition_to(&self, screen: Screen);
    fn update_selection(&self, selection: Option<PaymentOption>);
    fn on_form_field_values_changed(&self, values: FormValues, code: PaymentMethodCode);
    fn on_select_saved_payment_method(&self, instrument: SavedInstrument);
    fn on_edit_payment_method(&self, instrument: DisplayableSavedInstrument);
    fn on_delete_payment_method(&self, instrument: SavedInstrument);
    fn on_add_card_pressed(&self);
}

pub type RemoverRef = Arc<dyn PaymentMethodRemover>;
pub type UpdaterRef = Arc<dyn PaymentMethodUpdater>;
pub type FormFieldLookupRef = Arc<dyn FormFieldLookup>;
pub type PaymentSheetHostRef = Arc<dyn PaymentSheetHost>;
