use super::payment_option::{DisplayableOption, WalletKind};
use serde::{Deserialize, Serialize};

/// Which one-tap wallets are currently available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct WalletsState {
    pub quick_pay: bool,
    pub deferred_pay: bool,
}

impl WalletsState {
    /// Available wallets in display order.
    pub fn available(&self) -> Vec<WalletKind> {
        [(WalletKind::QuickPay, self.quick_pay), (WalletKind::DeferredPay, self.deferred_pay)]
            .into_iter()
            .filter_map(|(kind, available)| available.then_some(kind))
            .collect()
    }

    pub fn any(&self) -> bool {
        self.quick_pay || self.deferred_pay
    }
}

/// Where wallets are rendered relative to the option list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WalletPlacement {
    /// Wallets render in a dedicated header above the list.
    #[default]
    Header,
    /// Wallets render as rows of the list (embedded flow controller).
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedOptions {
    pub options: Vec<DisplayableOption>,
    pub shows_wallets_header: bool,
}

/// Merges wallets into the list of non-wallet options.
///
/// Inline placement yields `[first, QuickPay?, DeferredPay?, ...rest]`; header
/// placement leaves wallets out of the list and reports whether the header shows.
pub fn aggregate(
    placement: WalletPlacement,
    wallets: Option<WalletsState>,
    options: &[DisplayableOption],
) -> AggregatedOptions {
    let wallets = wallets.unwrap_or_default();
    let mut non_wallet = options.iter().filter(|option| !option.is_wallet()).cloned();

    match placement {
        WalletPlacement::Header => AggregatedOptions {
            options: non_wallet.collect(),
            shows_wallets_header: wallets.any(),
        },
        WalletPlacement::Inline => {
            let mut merged = Vec::with_capacity(options.len() + 2);
            merged.extend(non_wallet.next());
            merged.extend(
                wallets
                    .available()
                    .into_iter()
                    .map(|wallet| DisplayableOption::Wallet { wallet }),
            );
            merged.extend(non_wallet);
            AggregatedOptions {
                options: merged,
                shows_wallets_header: false,
            }
        }
    }
}
