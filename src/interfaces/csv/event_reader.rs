use crate::domain::payment_option::{CardBrand, PaymentMethodCode, WalletKind};
use crate::domain::screen::{CvcRecollectionState, Screen};
use crate::domain::wallets::WalletsState;
use crate::error::{PaymentSheetError, Result};
use serde::Deserialize;
use std::io::Read;

/// Layout view actions as written in a scenario; instruments are referenced by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewActionRequest {
    SelectPaymentMethod(PaymentMethodCode),
    DeletePaymentMethod(String),
    EditPaymentMethod(String),
    AddCardPressed,
    TransitionToManage,
    TransitionToManageOne,
    SavedInstrumentSelected(String),
}

/// One step of a replay scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioEvent {
    SelectSaved(String),
    SelectNew(PaymentMethodCode),
    SelectWallet(WalletKind),
    ClearSelection,
    Wallets(Option<WalletsState>),
    Processing(bool),
    Editing(bool),
    Screen(Screen),
    MostRecent(Option<String>),
    ViewAction(ViewActionRequest),
    Remove(String),
    UpdateBrand { id: String, brand: CardBrand },
    ButtonsEnabled(bool),
    CvcComplete(bool),
    FailNext(String),
}

impl ScenarioEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectSaved(_) => "select_saved",
            Self::SelectNew(_) => "select_new",
            Self::SelectWallet(_) => "select_wallet",
            Self::ClearSelection => "clear_selection",
            Self::Wallets(_) => "wallets",
            Self::Processing(_) => "processing",
            Self::Editing(_) => "editing",
            Self::Screen(_) => "screen",
            Self::MostRecent(_) => "most_recent",
            Self::ViewAction(_) => "view_action",
            Self::Remove(_) => "remove",
            Self::UpdateBrand { .. } => "update_brand",
            Self::ButtonsEnabled(_) => "buttons_enabled",
            Self::CvcComplete(_) => "cvc_complete",
            Self::FailNext(_) => "fail_next",
        }
    }
}

#[derive(Debug, Deserialize)]
struct EventRecord {
    event: String,
    #[serde(default)]
    arg: Option<String>,
}

impl TryFrom<EventRecord> for ScenarioEvent {
    type Error = PaymentSheetError;

    fn try_from(record: EventRecord) -> Result<Self> {
        let arg = record.arg.unwrap_or_default();
        let event = match record.event.as_str() {
            "select_saved" => Self::SelectSaved(required(&record.event, &arg)?),
            "select_new" => Self::SelectNew(required(&record.event, &arg)?.into()),
            "select_wallet" => Self::SelectWallet(
                WalletKind::from_code(&arg)
                    .ok_or_else(|| invalid(format!("unknown wallet '{arg}'")))?,
            ),
            "clear_selection" => Self::ClearSelection,
            "wallets" => Self::Wallets(parse_wallets(&arg)?),
            "processing" => Self::Processing(parse_flag(&arg)?),
            "editing" => Self::Editing(parse_flag(&arg)?),
            "screen" => Self::Screen(parse_screen(&arg)?),
            "most_recent" => Self::MostRecent((!arg.is_empty()).then_some(arg)),
            "view_action" => Self::ViewAction(parse_view_action(&arg)?),
            "remove" => Self::Remove(required(&record.event, &arg)?),
            "update_brand" => {
                let (id, brand) = arg
                    .split_once(':')
                    .ok_or_else(|| invalid(format!("expected '<id>:<brand>', got '{arg}'")))?;
                let brand = CardBrand::from_code(brand);
                if brand == CardBrand::Unknown {
                    return Err(invalid(format!("unknown card brand in '{arg}'")));
                }
                Self::UpdateBrand {
                    id: id.trim().to_string(),
                    brand,
                }
            }
            "buttons_enabled" => Self::ButtonsEnabled(parse_flag(&arg)?),
            "cvc_complete" => Self::CvcComplete(parse_flag(&arg)?),
            "fail_next" => Self::FailNext(arg),
            other => return Err(invalid(format!("unknown event '{other}'"))),
        };
        Ok(event)
    }
}

fn invalid(message: String) -> PaymentSheetError {
    PaymentSheetError::InvalidEvent(message)
}

fn required(event: &str, arg: &str) -> Result<String> {
    if arg.is_empty() {
        Err(invalid(format!("'{event}' needs an argument")))
    } else {
        Ok(arg.to_string())
    }
}

fn parse_flag(arg: &str) -> Result<bool> {
    match arg.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(invalid(format!("expected a boolean, got '{arg}'"))),
    }
}

/// `none` means wallet availability is unknown; otherwise a `|`-separated list,
/// possibly empty.
fn parse_wallets(arg: &str) -> Result<Option<WalletsState>> {
    if arg.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let mut state = WalletsState::default();
    for code in arg.split('|').map(str::trim).filter(|code| !code.is_empty()) {
        match WalletKind::from_code(code) {
            Some(WalletKind::QuickPay) => state.quick_pay = true,
            Some(WalletKind::DeferredPay) => state.deferred_pay = true,
            None => return Err(invalid(format!("unknown wallet '{code}'"))),
        }
    }
    Ok(Some(state))
}

fn parse_screen(arg: &str) -> Result<Screen> {
    let (name, detail) = match arg.split_once(':') {
        Some((name, detail)) => (name, Some(detail.trim())),
        None => (arg, None),
    };
    let screen = match (name, detail) {
        ("loading", None) => Screen::Loading,
        ("vertical_mode", None) => Screen::VerticalMode,
        ("form", Some(code)) if !code.is_empty() => Screen::Form { code: code.into() },
        ("select_saved_payment_methods", None) => Screen::SelectSavedPaymentMethods {
            cvc_recollection: CvcRecollectionState::NotRequired,
        },
        ("select_saved_payment_methods", Some("cvc")) => Screen::SelectSavedPaymentMethods {
            cvc_recollection: CvcRecollectionState::Required,
        },
        ("add_first_payment_method", None) => Screen::AddFirstPaymentMethod,
        ("add_another_payment_method", None) => Screen::AddAnotherPaymentMethod,
        ("manage_saved_payment_methods", None) => Screen::ManageSavedPaymentMethods,
        ("manage_one_saved_payment_method", None) => Screen::ManageOneSavedPaymentMethod,
        ("edit_payment_method", None) => Screen::EditPaymentMethod,
        _ => return Err(invalid(format!("unknown screen '{arg}'"))),
    };
    Ok(screen)
}

fn parse_view_action(arg: &str) -> Result<ViewActionRequest> {
    let (name, target) = match arg.split_once(':') {
        Some((name, target)) => (name, target.trim()),
        None => (arg, ""),
    };
    let action = match name {
        "select_payment_method" => {
            ViewActionRequest::SelectPaymentMethod(required(name, target)?.into())
        }
        "delete_payment_method" => ViewActionRequest::DeletePaymentMethod(required(name, target)?),
        "edit_payment_method" => ViewActionRequest::EditPaymentMethod(required(name, target)?),
        "add_card_pressed" => ViewActionRequest::AddCardPressed,
        "transition_to_manage" => ViewActionRequest::TransitionToManage,
        "transition_to_manage_one" => ViewActionRequest::TransitionToManageOne,
        "saved_instrument_selected" => {
            ViewActionRequest::SavedInstrumentSelected(required(name, target)?)
        }
        _ => return Err(invalid(format!("unknown view action '{arg}'"))),
    };
    Ok(action)
}

/// Reads scenario events from a CSV source with the header `event,arg`.
///
/// Rows that fail to parse come out as errors so the caller can report them and
/// carry on with the next row.
pub struct EventReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> EventReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn events(self) -> impl Iterator<Item = Result<ScenarioEvent>> {
        self.reader.into_deserialize().map(|result| {
            result
                .map_err(PaymentSheetError::from)
                .and_then(|record: EventRecord| ScenarioEvent::try_from(record))
        })
    }
}
