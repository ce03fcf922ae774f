use crate::domain::payment_option::{CardBrand, PaymentMethodCode, SavedInstrument};
use crate::domain::ports::{FormFieldLookup, PaymentMethodRemover, PaymentMethodUpdater};
use crate::error::OperationError;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use tracing::debug;

/// An in-memory customer instrument store.
///
/// It is the single writer of the saved-instrument list: every change made through
/// the remover/updater ports is published on a `watch` channel that interactors
/// subscribe to. The list is `None` until [`load`](Self::load) is called.
#[derive(Clone)]
pub struct InMemoryInstrumentRepository {
    instruments: Arc<watch::Sender<Option<Vec<SavedInstrument>>>>,
    fail_next: Arc<RwLock<Option<OperationError>>>,
}

impl Default for InMemoryInstrumentRepository {
    fn default() -> Self {
        Self {
            instruments: Arc::new(watch::channel(None).0),
            fail_next: Arc::default(),
        }
    }
}

impl InMemoryInstrumentRepository {
    /// Creates a repository whose list is still loading.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instruments(instruments: Vec<SavedInstrument>) -> Self {
        let repository = Self::new();
        repository.load(instruments);
        repository
    }

    pub fn load(&self, instruments: Vec<SavedInstrument>) {
        self.instruments.send_replace(Some(instruments));
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Vec<SavedInstrument>>> {
        self.instruments.subscribe()
    }

    pub fn find(&self, id: &str) -> Option<SavedInstrument> {
        self.instruments
            .borrow()
            .as_ref()
            .and_then(|instruments| {
                instruments
                    .iter()
                    .find(|instrument| instrument.id == id)
                    .cloned()
            })
    }

    /// Makes the next remove or update fail with `error`.
    pub async fn fail_next_operation(&self, error: OperationError) {
        *self.fail_next.write().await = Some(error);
    }

    async fn take_failure(&self) -> Result<(), OperationError> {
        match self.fail_next.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PaymentMethodRemover for InMemoryInstrumentRepository {
    async fn remove(&self, instrument: &SavedInstrument) -> Result<(), OperationError> {
        self.take_failure().await?;

        let mut removed = false;
        self.instruments.send_if_modified(|instruments| {
            if let Some(list) = instruments {
                let before = list.len();
                list.retain(|candidate| candidate.id != instrument.id);
                removed = list.len() != before;
            }
            removed
        });

        if removed {
            debug!(id = %instrument.id, "instrument removed");
            Ok(())
        } else {
            Err(OperationError::new(format!(
                "No such payment method: {}",
                instrument.id
            )))
        }
    }
}

#[async_trait]
impl PaymentMethodUpdater for InMemoryInstrumentRepository {
    async fn update(
        &self,
        instrument: &SavedInstrument,
        brand: CardBrand,
    ) -> Result<SavedInstrument, OperationError> {
        self.take_failure().await?;

        let available = instrument.available_brands();
        if !available.contains(&brand) {
            return Err(OperationError::new(format!(
                "{} is not an available network for this card",
                brand.display_name()
            )));
        }

        let updated = instrument.clone().with_networks(available, Some(brand));
        let mut found = false;
        self.instruments.send_if_modified(|instruments| {
            if let Some(slot) = instruments
                .iter_mut()
                .flatten()
                .find(|candidate| candidate.id == instrument.id)
            {
                *slot = updated.clone();
                found = true;
            }
            found
        });

        if found {
            debug!(id = %instrument.id, brand = brand.code(), "preferred network updated");
            Ok(updated)
        } else {
            Err(OperationError::new(format!(
                "No such payment method: {}",
                instrument.id
            )))
        }
    }
}

/// Form lookup backed by a fixed set of codes whose forms need user input.
#[derive(Debug, Default, Clone)]
pub struct StaticFormFieldLookup {
    requiring_interaction: HashSet<PaymentMethodCode>,
}

impl StaticFormFieldLookup {
    pub fn new(codes: impl IntoIterator<Item = PaymentMethodCode>) -> Self {
        Self {
            requiring_interaction: codes.into_iter().collect(),
        }
    }
}

impl FormFieldLookup for StaticFormFieldLookup {
    fn requires_user_interaction(&self, code: &PaymentMethodCode) -> bool {
        self.requiring_interaction.contains(code)
    }
}
