use crate::domain::payment_option::{CardBrand, CardNetworks, PaymentMethodCode, SavedInstrument};
use crate::error::{PaymentSheetError, Result};
use serde::Deserialize;
use std::io::Read;

/// One row of a saved-instruments file:
/// `id,type,brand,last4,networks,preferred` with `|`-separated networks.
#[derive(Debug, Deserialize)]
struct InstrumentRecord {
    id: String,
    #[serde(rename = "type")]
    method_type: String,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    last4: Option<String>,
    #[serde(default)]
    networks: Option<String>,
    #[serde(default)]
    preferred: Option<String>,
}

impl From<InstrumentRecord> for SavedInstrument {
    fn from(record: InstrumentRecord) -> Self {
        let available: Vec<CardBrand> = record
            .networks
            .as_deref()
            .map(|networks| {
                networks
                    .split('|')
                    .filter(|network| !network.trim().is_empty())
                    .map(CardBrand::from_code)
                    .collect()
            })
            .unwrap_or_default();
        let preferred = record.preferred.as_deref().map(CardBrand::from_code);
        let networks = (!available.is_empty() || preferred.is_some()).then_some(CardNetworks {
            available,
            preferred,
        });

        SavedInstrument {
            id: record.id,
            method_type: PaymentMethodCode::new(record.method_type.to_ascii_lowercase()),
            brand: record
                .brand
                .as_deref()
                .map(CardBrand::from_code)
                .unwrap_or_default(),
            last4: record.last4,
            networks,
        }
    }
}

/// Reads saved instruments from a CSV source, in file order.
pub struct InstrumentReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> InstrumentReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn instruments(self) -> impl Iterator<Item = Result<SavedInstrument>> {
        self.reader.into_deserialize().map(|result| {
            result
                .map(|record: InstrumentRecord| SavedInstrument::from(record))
                .map_err(PaymentSheetError::from)
        })
    }
}
