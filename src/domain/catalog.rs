use super::payment_option::{DisplayableSavedInstrument, SavedInstrument};
use super::strings::{ResolvableString, StringId};
use serde::{Deserialize, Serialize};

/// Bulk operation the customer may perform on their saved instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ManagementAction {
    None,
    EditBrand,
    ManageOne,
    ManageAll,
}

/// Ordered, deduplicated view over the customer's saved instruments.
///
/// `instruments` is `None` while the list is still loading.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SavedInstrumentCatalog {
    instruments: Option<Vec<SavedInstrument>>,
    most_recently_used: Option<SavedInstrument>,
    allows_removal_of_last: bool,
    card_brand_choice_eligible: bool,
}

impl SavedInstrumentCatalog {
    pub fn new(allows_removal_of_last: bool, card_brand_choice_eligible: bool) -> Self {
        Self {
            instruments: None,
            most_recently_used: None,
            allows_removal_of_last,
            card_brand_choice_eligible,
        }
    }

    /// Replaces the instrument list. Later duplicates of an id are dropped.
    pub fn set_instruments(&mut self, instruments: Option<Vec<SavedInstrument>>) {
        self.instruments = instruments.map(dedup_by_id);
    }

    pub fn set_most_recently_used(&mut self, instrument: Option<SavedInstrument>) {
        self.most_recently_used = instrument;
    }

    pub fn instruments(&self) -> &[SavedInstrument] {
        self.instruments.as_deref().unwrap_or_default()
    }

    pub fn is_loaded(&self) -> bool {
        self.instruments.is_some()
    }

    pub fn find(&self, id: &str) -> Option<&SavedInstrument> {
        self.instruments().iter().find(|instrument| instrument.id == id)
    }

    /// The most-recently-used instrument if it is still saved, else the first one.
    pub fn displayed_saved_instrument(&self) -> Option<DisplayableSavedInstrument> {
        let instruments = self.instruments();
        self.most_recently_used
            .as_ref()
            .and_then(|recent| instruments.iter().find(|saved| saved.id == recent.id))
            .or_else(|| instruments.first())
            .map(|instrument| self.to_displayable(instrument))
    }

    pub fn management_action(&self) -> ManagementAction {
        management_action(
            self.instruments()
                .iter()
                .map(|instrument| self.is_modifiable(instrument)),
            self.allows_removal_of_last,
        )
    }

    pub fn is_modifiable(&self, instrument: &SavedInstrument) -> bool {
        self.card_brand_choice_eligible && instrument.has_brand_choice()
    }

    pub fn to_displayable(&self, instrument: &SavedInstrument) -> DisplayableSavedInstrument {
        DisplayableSavedInstrument {
            instrument: instrument.clone(),
            display_name: display_name(instrument),
            is_modifiable: self.is_modifiable(instrument),
        }
    }
}

/// Computes the management action from per-instrument modifiability flags.
pub fn management_action(
    modifiable: impl IntoIterator<Item = bool>,
    allows_removal_of_last: bool,
) -> ManagementAction {
    let mut modifiable = modifiable.into_iter();
    match (modifiable.next(), modifiable.next()) {
        (None, _) => ManagementAction::None,
        (Some(_), Some(_)) => ManagementAction::ManageAll,
        (Some(_), None) if allows_removal_of_last => ManagementAction::ManageOne,
        (Some(true), None) => ManagementAction::EditBrand,
        (Some(false), None) => ManagementAction::None,
    }
}

fn display_name(instrument: &SavedInstrument) -> ResolvableString {
    match &instrument.last4 {
        Some(last4) => ResolvableString::resource_with_args(
            StringId::SavedCardLabel,
            vec![instrument.brand.display_name().to_string(), last4.clone()],
        ),
        None => ResolvableString::literal(instrument.method_type.to_string()),
    }
}

fn dedup_by_id(instruments: Vec<SavedInstrument>) -> Vec<SavedInstrument> {
    let mut seen = std::collections::HashSet::new();
    instruments
        .into_iter()
        .filter(|instrument| seen.insert(instrument.id.clone()))
        .collect()
}
