#![allow(dead_code)]

use paysheet::application::aggregator::LayoutSettings;
use paysheet::application::layout::{LayoutInputs, VerticalLayoutInteractor};
use paysheet::domain::payment_option::{
    CardBrand, DisplayableOption, PaymentMethodCode, SavedInstrument, SupportedPaymentMethod,
    WalletKind,
};
use paysheet::domain::ports::PaymentSheetHostRef;
use paysheet::domain::screen::Screen;
use paysheet::domain::strings::ResolvableString;
use paysheet::domain::wallets::{WalletPlacement, WalletsState};
use paysheet::infrastructure::in_memory::{InMemoryInstrumentRepository, StaticFormFieldLookup};
use paysheet::infrastructure::sheet_flow::{HostCall, InMemorySheetFlow};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

pub fn card(id: &str) -> SavedInstrument {
    SavedInstrument::card(id, CardBrand::Visa, "4242")
}

/// A Cartes Bancaires / Visa card, preferring Cartes Bancaires.
pub fn cobranded(id: &str) -> SavedInstrument {
    SavedInstrument::card(id, CardBrand::CartesBancaires, "1001").with_networks(
        vec![CardBrand::CartesBancaires, CardBrand::Visa],
        Some(CardBrand::CartesBancaires),
    )
}

/// Option rows for the given codes; wallet codes become wallet rows.
pub fn options(codes: &[&str]) -> Vec<DisplayableOption> {
    codes
        .iter()
        .map(|code| match WalletKind::from_code(code) {
            Some(wallet) => DisplayableOption::Wallet { wallet },
            None => DisplayableOption::PaymentMethod(SupportedPaymentMethod::new(
                *code,
                ResolvableString::literal(*code),
            )),
        })
        .collect()
}

pub fn option_codes(options: &[DisplayableOption]) -> Vec<String> {
    options.iter().map(|option| option.code().to_string()).collect()
}

pub fn settings(placement: WalletPlacement, allows_removal_of_last: bool) -> LayoutSettings {
    LayoutSettings {
        options: options(&["card", "cashapp", "us_bank_account"]),
        wallet_placement: placement,
        allows_removal_of_last,
        card_brand_choice_eligible: true,
    }
}

pub const BOTH_WALLETS: WalletsState = WalletsState {
    quick_pay: true,
    deferred_pay: true,
};

/// A vertical layout wired to in-memory collaborators. Only `card` requires form
/// interaction.
pub struct LayoutHarness {
    pub interactor: VerticalLayoutInteractor,
    pub repository: InMemoryInstrumentRepository,
    pub flow: Arc<InMemorySheetFlow>,
    pub calls: mpsc::UnboundedReceiver<HostCall>,
    pub most_recent: watch::Sender<Option<SavedInstrument>>,
    pub wallets: watch::Sender<Option<WalletsState>>,
    pub processing: watch::Sender<bool>,
    pub editing: watch::Sender<bool>,
}

impl LayoutHarness {
    pub fn new(
        settings: LayoutSettings,
        instruments: Vec<SavedInstrument>,
        screen: Screen,
    ) -> Self {
        let repository = InMemoryInstrumentRepository::with_instruments(instruments);
        let (flow, calls) = InMemorySheetFlow::new(screen);
        let flow = Arc::new(flow);
        let host: PaymentSheetHostRef = flow.clone();

        let (most_recent, most_recent_rx) = watch::channel(None);
        let (wallets, wallets_rx) = watch::channel(None);
        let (processing, processing_rx) = watch::channel(false);
        let (editing, editing_rx) = watch::channel(false);

        let interactor = VerticalLayoutInteractor::new(
            settings,
            LayoutInputs {
                instruments: repository.subscribe(),
                most_recently_used: most_recent_rx,
                selection: flow.selection(),
                wallets: wallets_rx,
                processing: processing_rx,
                editing: editing_rx,
                is_current_screen: flow.vertical_mode_current(),
            },
            Arc::new(StaticFormFieldLookup::new([PaymentMethodCode::new("card")])),
            host,
        );

        Self {
            interactor,
            repository,
            flow,
            calls,
            most_recent,
            wallets,
            processing,
            editing,
        }
    }

    /// Flushes twice so selection commits made by the layout are read back.
    pub async fn settle(&self) {
        self.interactor.flush().await.unwrap();
        self.interactor.flush().await.unwrap();
    }

    pub fn drain_calls(&mut self) -> Vec<HostCall> {
        std::iter::from_fn(|| self.calls.try_recv().ok()).collect()
    }
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("Failed to write fixture");
    path
}

/// Writes a random but well-formed scenario over the instruments `pm_0..pm_{n}`.
pub fn generate_events_csv(
    path: &Path,
    rows: usize,
    instruments: usize,
    seed: u64,
) -> std::io::Result<()> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(seed);
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["event", "arg"])?;

    let flags = ["true", "false"];
    let wallets = ["none", "quick_pay", "deferred_pay", "quick_pay|deferred_pay"];
    let screens = ["vertical_mode", "manage_saved_payment_methods", "form:card", "loading"];
    for _ in 0..rows {
        let id = format!("pm_{}", rng.gen_range(0..instruments.max(1)));
        let (event, arg) = match rng.gen_range(0..8) {
            0 => ("select_saved", id),
            1 => ("select_new", ["card", "cashapp"][rng.gen_range(0..2)].to_string()),
            2 => ("select_wallet", ["quick_pay", "deferred_pay"][rng.gen_range(0..2)].to_string()),
            3 => ("wallets", wallets[rng.gen_range(0..wallets.len())].to_string()),
            4 => ("processing", flags[rng.gen_range(0..2)].to_string()),
            5 => ("screen", screens[rng.gen_range(0..screens.len())].to_string()),
            6 => ("most_recent", id),
            _ => ("clear_selection", String::new()),
        };
        writer.write_record([event, arg.as_str()])?;
    }
    writer.flush()
}

pub fn instruments_csv(count: usize) -> String {
    let mut csv = String::from("id,type,brand,last4,networks,preferred\n");
    for i in 0..count {
        if i % 2 == 0 {
            csv.push_str(&format!("pm_{i},card,visa,{:04},,\n", 4242 + i));
        } else {
            csv.push_str(&format!(
                "pm_{i},card,cartes_bancaires,{:04},cartes_bancaires|visa,\n",
                1000 + i
            ));
        }
    }
    csv
}
