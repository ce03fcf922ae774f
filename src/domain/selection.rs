use super::catalog::SavedInstrumentCatalog;
use super::payment_option::{PaymentMethodCode, PaymentOption};
use super::ports::FormFieldLookup;
use tracing::debug;

/// Codes that always collect their details on a dedicated form screen.
const ALWAYS_FORM_SCREEN: [&str; 2] = [
    PaymentMethodCode::US_BANK_ACCOUNT,
    PaymentMethodCode::INSTANT_DEBITS,
];

/// True when choosing `code` has to go through a form screen first.
pub fn requires_form_screen(lookup: &dyn FormFieldLookup, code: &PaymentMethodCode) -> bool {
    ALWAYS_FORM_SCREEN.contains(&code.as_str()) || lookup.requires_user_interaction(code)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Accept,
    Reject,
}

/// Filters raw selection changes before they reach the published selection.
///
/// A new, unsaved payment method whose form still needs input is never shown as
/// the selection; the previous selection is kept instead.
#[derive(Debug, Clone, Default)]
pub struct SelectionGuard {
    accepted: Option<PaymentOption>,
}

impl SelectionGuard {
    /// Adopts the cold-start selection without consulting the lookup.
    pub fn with_initial(initial: Option<PaymentOption>) -> Self {
        Self { accepted: initial }
    }

    pub fn accepted(&self) -> Option<&PaymentOption> {
        self.accepted.as_ref()
    }

    pub fn evaluate(
        lookup: &dyn FormFieldLookup,
        candidate: Option<&PaymentOption>,
    ) -> GuardDecision {
        match candidate {
            None | Some(PaymentOption::SavedInstrument(_)) | Some(PaymentOption::Wallet { .. }) => {
                GuardDecision::Accept
            }
            Some(PaymentOption::NewMethod(new)) => {
                if new.requires_confirmation || !requires_form_screen(lookup, &new.code) {
                    GuardDecision::Accept
                } else {
                    GuardDecision::Reject
                }
            }
        }
    }

    /// Offers a raw selection. Returns `true` when the accepted selection changed.
    pub fn offer(
        &mut self,
        lookup: &dyn FormFieldLookup,
        candidate: Option<PaymentOption>,
    ) -> bool {
        match Self::evaluate(lookup, candidate.as_ref()) {
            GuardDecision::Accept => {
                let changed = self.accepted != candidate;
                self.accepted = candidate;
                changed
            }
            GuardDecision::Reject => {
                let code = candidate
                    .as_ref()
                    .map(PaymentOption::code)
                    .unwrap_or_else(|| "none".into());
                debug!(%code, "selection rejected: form requires user interaction");
                false
            }
        }
    }
}

/// Chooses the authoritative selection from the guarded explicit selection and
/// the catalog's displayed saved instrument.
pub struct SelectionResolver;

impl SelectionResolver {
    pub fn resolve(
        explicit: Option<&PaymentOption>,
        catalog: &SavedInstrumentCatalog,
    ) -> Option<PaymentOption> {
        explicit
            .and_then(|selection| Self::bind(selection, catalog))
            .or_else(|| {
                catalog
                    .displayed_saved_instrument()
                    .map(|displayed| PaymentOption::SavedInstrument(displayed.instrument))
            })
    }

    /// A saved selection resolves to the catalog's current record for its id, so
    /// it never disagrees with the displayed instrument. While the catalog is still
    /// loading the selection is kept as given.
    fn bind(
        selection: &PaymentOption,
        catalog: &SavedInstrumentCatalog,
    ) -> Option<PaymentOption> {
        match selection {
            PaymentOption::SavedInstrument(_) if !catalog.is_loaded() => {
                Some(selection.clone())
            }
            PaymentOption::SavedInstrument(instrument) => catalog
                .find(&instrument.id)
                .cloned()
                .map(PaymentOption::SavedInstrument),
            PaymentOption::NewMethod(_) | PaymentOption::Wallet { .. } => Some(selection.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment_option::{CardBrand, NewMethod, SavedInstrument, WalletKind};
    use std::collections::HashSet;

    struct Lookup(HashSet<&'static str>);

    impl FormFieldLookup for Lookup {
        fn requires_user_interaction(&self, code: &PaymentMethodCode) -> bool {
            self.0.contains(code.as_str())
        }
    }

    fn card_needs_input() -> Lookup {
        Lookup(HashSet::from(["card"]))
    }

    fn saved(id: &str) -> SavedInstrument {
        SavedInstrument::card(id, CardBrand::Visa, "4242")
    }

    fn catalog(instruments: Vec<SavedInstrument>) -> SavedInstrumentCatalog {
        let mut catalog = SavedInstrumentCatalog::new(true, false);
        catalog.set_instruments(Some(instruments));
        catalog
    }

    #[test]
    fn test_guard_rejects_new_method_needing_input() {
        let lookup = card_needs_input();
        let wallet = PaymentOption::wallet(WalletKind::QuickPay);
        let mut guard = SelectionGuard::with_initial(Some(wallet.clone()));

        let changed = guard.offer(&lookup, Some(PaymentOption::NewMethod(NewMethod::new("card"))));
        assert!(!changed);
        assert_eq!(guard.accepted(), Some(&wallet));
    }

    #[test]
    fn test_guard_accepts_new_method_without_input() {
        let lookup = card_needs_input();
        let mut guard =
            SelectionGuard::with_initial(Some(PaymentOption::wallet(WalletKind::QuickPay)));
        let cashapp = PaymentOption::NewMethod(NewMethod::new("cashapp"));

        assert!(guard.offer(&lookup, Some(cashapp.clone())));
        assert_eq!(guard.accepted(), Some(&cashapp));
    }

    #[test]
    fn test_guard_accepts_confirmation_required_selection() {
        let lookup = Lookup(HashSet::new());
        let mut bank = NewMethod::new(PaymentMethodCode::US_BANK_ACCOUNT);
        assert_eq!(
            SelectionGuard::evaluate(&lookup, Some(&PaymentOption::NewMethod(bank.clone()))),
            GuardDecision::Reject
        );

        bank.requires_confirmation = true;
        assert_eq!(
            SelectionGuard::evaluate(&lookup, Some(&PaymentOption::NewMethod(bank))),
            GuardDecision::Accept
        );
    }

    #[test]
    fn test_guard_accepts_saved_and_wallet() {
        let lookup = card_needs_input();
        let mut guard = SelectionGuard::default();
        assert!(guard.offer(&lookup, Some(PaymentOption::SavedInstrument(saved("pm_1")))));
        assert!(guard.offer(&lookup, Some(PaymentOption::wallet(WalletKind::DeferredPay))));
        assert!(!guard.offer(&lookup, Some(PaymentOption::wallet(WalletKind::DeferredPay))));
    }

    #[test]
    fn test_cold_start_bypasses_guard() {
        let new_card = PaymentOption::NewMethod(NewMethod::new("card"));
        let guard = SelectionGuard::with_initial(Some(new_card.clone()));
        assert_eq!(guard.accepted(), Some(&new_card));
    }

    #[test]
    fn test_resolver_prefers_explicit_selection() {
        let instruments = vec![saved("pm_0"), saved("pm_1"), saved("pm_2")];
        let catalog = catalog(instruments.clone());
        let explicit = PaymentOption::SavedInstrument(instruments[1].clone());

        assert_eq!(SelectionResolver::resolve(Some(&explicit), &catalog), Some(explicit));
    }

    #[test]
    fn test_resolver_falls_back_to_displayed_instrument() {
        let instruments = vec![saved("pm_0"), saved("pm_1")];
        let mut catalog = catalog(instruments.clone());
        catalog.set_most_recently_used(Some(instruments[1].clone()));

        assert_eq!(
            SelectionResolver::resolve(None, &catalog),
            Some(PaymentOption::SavedInstrument(instruments[1].clone()))
        );

        catalog.set_instruments(Some(vec![]));
        assert_eq!(SelectionResolver::resolve(None, &catalog), None);
    }

    #[test]
    fn test_resolver_drops_removed_saved_selection() {
        let instruments = vec![saved("pm_0"), saved("pm_1")];
        let catalog = catalog(vec![instruments[0].clone()]);
        let stale = PaymentOption::SavedInstrument(instruments[1].clone());

        assert_eq!(
            SelectionResolver::resolve(Some(&stale), &catalog),
            Some(PaymentOption::SavedInstrument(instruments[0].clone()))
        );
    }

    #[test]
    fn test_resolver_uses_current_catalog_record() {
        let stale = saved("pm_cb");
        let updated = stale.clone().with_networks(
            vec![CardBrand::CartesBancaires, CardBrand::Visa],
            Some(CardBrand::Visa),
        );
        let catalog = catalog(vec![saved("pm_0"), updated.clone()]);

        assert_eq!(
            SelectionResolver::resolve(Some(&PaymentOption::SavedInstrument(stale)), &catalog),
            Some(PaymentOption::SavedInstrument(updated))
        );
    }

    #[test]
    fn test_resolver_keeps_saved_selection_while_loading() {
        let catalog = SavedInstrumentCatalog::new(true, false);
        let selection = PaymentOption::SavedInstrument(saved("pm_9"));
        assert_eq!(
            SelectionResolver::resolve(Some(&selection), &catalog),
            Some(selection)
        );
    }
}
