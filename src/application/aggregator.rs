use crate::domain::catalog::{ManagementAction, SavedInstrumentCatalog};
use crate::domain::payment_option::{
    DisplayableOption, DisplayableSavedInstrument, PaymentOption, SavedInstrument,
};
use crate::domain::ports::FormFieldLookupRef;
use crate::domain::selection::{SelectionGuard, SelectionResolver};
use crate::domain::wallets::{self, WalletPlacement, WalletsState};
use serde::Serialize;

/// One immutable, internally consistent state of the selection surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiSnapshot {
    pub options: Vec<DisplayableOption>,
    pub selection: Option<PaymentOption>,
    pub displayed_saved_instrument: Option<DisplayableSavedInstrument>,
    pub management_action: ManagementAction,
    pub is_processing: bool,
    pub is_editing: bool,
    pub shows_wallets_header: bool,
}

/// Static settings of one layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSettings {
    /// Non-wallet rows in display order.
    pub options: Vec<DisplayableOption>,
    pub wallet_placement: WalletPlacement,
    pub allows_removal_of_last: bool,
    pub card_brand_choice_eligible: bool,
}

/// Latest value of every upstream input at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputValues {
    pub instruments: Option<Vec<SavedInstrument>>,
    pub most_recently_used: Option<SavedInstrument>,
    pub selection: Option<PaymentOption>,
    pub wallets: Option<WalletsState>,
    pub processing: bool,
    pub editing: bool,
}

/// Holds the latest value of each input and derives snapshots from them.
///
/// All rules live here so a snapshot is always computed from one complete set of
/// inputs; the async driver only feeds values in and publishes what comes out.
pub struct StateAggregator {
    settings: LayoutSettings,
    lookup: FormFieldLookupRef,
    catalog: SavedInstrumentCatalog,
    guard: SelectionGuard,
    last_raw_selection: Option<PaymentOption>,
    wallets: Option<WalletsState>,
    processing: bool,
    editing: bool,
}

impl StateAggregator {
    /// The initial selection is adopted as-is; the guard only filters later changes.
    pub fn new(settings: LayoutSettings, lookup: FormFieldLookupRef, initial: InputValues) -> Self {
        let mut catalog = SavedInstrumentCatalog::new(
            settings.allows_removal_of_last,
            settings.card_brand_choice_eligible,
        );
        catalog.set_instruments(initial.instruments);
        catalog.set_most_recently_used(initial.most_recently_used);

        Self {
            settings,
            lookup,
            catalog,
            guard: SelectionGuard::with_initial(initial.selection.clone()),
            last_raw_selection: initial.selection,
            wallets: initial.wallets,
            processing: initial.processing,
            editing: initial.editing,
        }
    }

    /// Absorbs the latest input values.
    pub fn apply(&mut self, values: InputValues) {
        let InputValues {
            instruments,
            most_recently_used,
            selection,
            wallets,
            processing,
            editing,
        } = values;

        self.catalog.set_instruments(instruments);
        self.catalog.set_most_recently_used(most_recently_used);
        if selection != self.last_raw_selection {
            self.guard.offer(self.lookup.as_ref(), selection.clone());
            self.last_raw_selection = selection;
        }
        self.wallets = wallets;
        self.processing = processing;
        self.editing = editing;
    }

    pub fn resolved_selection(&self) -> Option<PaymentOption> {
        SelectionResolver::resolve(self.guard.accepted(), &self.catalog)
    }

    pub fn catalog(&self) -> &SavedInstrumentCatalog {
        &self.catalog
    }

    pub fn snapshot(&self) -> UiSnapshot {
        let aggregated = wallets::aggregate(
            self.settings.wallet_placement,
            self.wallets,
            &self.settings.options,
        );
        UiSnapshot {
            options: aggregated.options,
            selection: self.resolved_selection(),
            displayed_saved_instrument: self.catalog.displayed_saved_instrument(),
            management_action: self.catalog.management_action(),
            is_processing: self.processing,
            is_editing: self.editing,
            shows_wallets_header: aggregated.shows_wallets_header,
        }
    }
}
