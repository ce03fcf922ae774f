mod common;

use assert_cmd::cargo_bin;
use common::{cobranded, generate_events_csv, instruments_csv, option_codes, options, write_file};
use paysheet::application::aggregator::{InputValues, LayoutSettings, StateAggregator};
use paysheet::domain::catalog::ManagementAction;
use paysheet::domain::payment_option::{
    CardBrand, NewMethod, PaymentMethodCode, PaymentOption, SavedInstrument, WalletKind,
};
use paysheet::domain::wallets::{WalletPlacement, WalletsState};
use paysheet::infrastructure::in_memory::StaticFormFieldLookup;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;

fn random_instruments(rng: &mut StdRng) -> Vec<SavedInstrument> {
    (0..rng.gen_range(0..5))
        .map(|i| {
            let id = format!("pm_{i}");
            if rng.gen_bool(0.5) {
                cobranded(&id)
            } else {
                SavedInstrument::card(id, CardBrand::Mastercard, "5555")
            }
        })
        .collect()
}

fn random_selection(rng: &mut StdRng, instruments: &[SavedInstrument]) -> Option<PaymentOption> {
    match rng.gen_range(0..5) {
        0 => None,
        1 => Some(PaymentOption::wallet(WalletKind::QuickPay)),
        2 => Some(PaymentOption::NewMethod(NewMethod::new("cashapp"))),
        3 => Some(PaymentOption::NewMethod(NewMethod::new("card"))),
        _ => instruments
            .get(rng.gen_range(0..instruments.len().max(1)))
            .cloned()
            .map(PaymentOption::SavedInstrument),
    }
}

fn random_inputs(rng: &mut StdRng) -> InputValues {
    let instruments = random_instruments(rng);
    InputValues {
        most_recently_used: instruments.last().cloned().filter(|_| rng.gen_bool(0.5)),
        selection: random_selection(rng, &instruments),
        instruments: Some(instruments),
        wallets: rng.gen_bool(0.7).then(|| WalletsState {
            quick_pay: rng.gen_bool(0.5),
            deferred_pay: rng.gen_bool(0.5),
        }),
        processing: rng.gen_bool(0.5),
        editing: rng.gen_bool(0.5),
    }
}

fn layout(placement: WalletPlacement, allows_removal_of_last: bool) -> LayoutSettings {
    LayoutSettings {
        options: options(&["card", "cashapp", "us_bank_account"]),
        wallet_placement: placement,
        allows_removal_of_last,
        card_brand_choice_eligible: true,
    }
}

fn aggregator(settings: LayoutSettings) -> StateAggregator {
    StateAggregator::new(
        settings,
        Arc::new(StaticFormFieldLookup::new([PaymentMethodCode::new("card")])),
        InputValues::default(),
    )
}

#[test]
fn test_management_action_matches_instrument_count() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..500 {
        let allows_removal_of_last = rng.gen_bool(0.5);
        let mut aggregator = aggregator(layout(WalletPlacement::Header, allows_removal_of_last));
        let inputs = random_inputs(&mut rng);
        let instruments = inputs.instruments.clone().unwrap_or_default();
        aggregator.apply(inputs);

        let expected = match instruments.as_slice() {
            [] => ManagementAction::None,
            [_] if allows_removal_of_last => ManagementAction::ManageOne,
            [only] if only.has_brand_choice() => ManagementAction::EditBrand,
            [_] => ManagementAction::None,
            _ => ManagementAction::ManageAll,
        };
        assert_eq!(aggregator.snapshot().management_action, expected);
    }
}

#[test]
fn test_snapshot_is_a_pure_function_of_inputs() {
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..300 {
        let placement = if rng.gen_bool(0.5) {
            WalletPlacement::Header
        } else {
            WalletPlacement::Inline
        };
        let mut aggregator = aggregator(layout(placement, true));
        let steps: Vec<InputValues> = (0..4).map(|_| random_inputs(&mut rng)).collect();
        for inputs in &steps {
            aggregator.apply(inputs.clone());
        }
        let settled = aggregator.snapshot();

        let last = steps.last().cloned().unwrap_or_default();
        aggregator.apply(last.clone());
        aggregator.apply(last);
        assert_eq!(aggregator.snapshot(), settled);
    }
}

#[test]
fn test_selection_is_always_resolvable() {
    let mut rng = StdRng::seed_from_u64(23);

    for _ in 0..500 {
        let mut aggregator = aggregator(layout(WalletPlacement::Header, true));
        for _ in 0..3 {
            let inputs = random_inputs(&mut rng);
            let instruments = inputs.instruments.clone().unwrap_or_default();
            aggregator.apply(inputs);
            let snapshot = aggregator.snapshot();

            match &snapshot.selection {
                Some(PaymentOption::SavedInstrument(saved)) => {
                    assert!(instruments.iter().any(|candidate| candidate.id == saved.id));
                }
                Some(PaymentOption::NewMethod(new)) => assert!(!new.code.is_card()),
                Some(PaymentOption::Wallet { .. }) => {}
                None => assert!(snapshot.displayed_saved_instrument.is_none()),
            }
        }
    }
}

#[test]
fn test_inline_wallets_sit_after_first_option() {
    let mut rng = StdRng::seed_from_u64(31);

    for _ in 0..200 {
        let wallets = WalletsState {
            quick_pay: rng.gen_bool(0.5),
            deferred_pay: rng.gen_bool(0.5),
        };
        let mut aggregator = aggregator(layout(WalletPlacement::Inline, true));
        aggregator.apply(InputValues {
            wallets: Some(wallets),
            ..InputValues::default()
        });
        let snapshot = aggregator.snapshot();

        let mut expected = vec!["card".to_string()];
        expected.extend(wallets.available().iter().map(|wallet| wallet.code().to_string()));
        expected.extend(["cashapp".to_string(), "us_bank_account".to_string()]);
        assert_eq!(option_codes(&snapshot.options), expected);
        assert!(!snapshot.shows_wallets_header);
    }
}

#[test]
fn test_cli_replays_generated_scenario() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let instruments = write_file(dir.path(), "instruments.csv", &instruments_csv(4));
    let events = dir.path().join("events.csv");
    generate_events_csv(&events, 200, 4, 42)?;

    let output = Command::new(cargo_bin!())
        .arg(&events)
        .arg("--instruments")
        .arg(&instruments)
        .output()?;
    assert!(output.status.success());

    // Start record plus one line per event.
    let stdout = String::from_utf8(output.stdout)?;
    assert_eq!(stdout.lines().count(), 201);
    for line in stdout.lines() {
        let record: serde_json::Value = serde_json::from_str(line)?;
        assert_eq!(record["snapshot"]["management_action"], "MANAGE_ALL");
    }

    Ok(())
}
