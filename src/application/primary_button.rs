use super::driver::{self, DriverHandle, Reactive, next_change};
use crate::domain::amount::Amount;
use crate::domain::payment_option::PaymentOption;
use crate::domain::primary_button::{
    PrimaryButtonInputs, PrimaryButtonStateResolver, PrimaryButtonUiState,
};
use crate::domain::screen::Screen;
use crate::error::Result;
use tokio::sync::watch;

/// Which flavour of primary button to derive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonFlow {
    /// Full sheet: the buy button.
    Complete,
    /// Embedded flow controller: the continue button.
    Custom,
}

pub struct PrimaryButtonSources {
    pub screen: watch::Receiver<Screen>,
    pub buttons_enabled: watch::Receiver<bool>,
    pub amount: watch::Receiver<Option<Amount>>,
    pub selection: watch::Receiver<Option<PaymentOption>>,
    pub custom_state: watch::Receiver<Option<PrimaryButtonUiState>>,
    pub cvc_complete: watch::Receiver<bool>,
}

impl PrimaryButtonSources {
    fn latest(&mut self) -> PrimaryButtonInputs {
        PrimaryButtonInputs {
            screen: self.screen.borrow_and_update().clone(),
            buttons_enabled: *self.buttons_enabled.borrow_and_update(),
            amount: self.amount.borrow_and_update().clone(),
            selection: self.selection.borrow_and_update().clone(),
            custom_state: self.custom_state.borrow_and_update().clone(),
            cvc_complete: *self.cvc_complete.borrow_and_update(),
        }
    }
}

struct ButtonReactor {
    sources: PrimaryButtonSources,
    resolver: PrimaryButtonStateResolver,
    flow: ButtonFlow,
    state: watch::Sender<Option<PrimaryButtonUiState>>,
}

impl ButtonReactor {
    fn compute(&mut self) -> Option<PrimaryButtonUiState> {
        let inputs = self.sources.latest();
        match self.flow {
            ButtonFlow::Complete => self.resolver.for_complete_flow(&inputs),
            ButtonFlow::Custom => self.resolver.for_custom_flow(&inputs),
        }
    }
}

impl Reactive for ButtonReactor {
    const NAME: &'static str = "primary_button";

    async fn input_changed(&mut self) {
        let sources = &mut self.sources;
        tokio::select! {
            _ = next_change(&mut sources.screen) => {}
            _ = next_change(&mut sources.buttons_enabled) => {}
            _ = next_change(&mut sources.amount) => {}
            _ = next_change(&mut sources.selection) => {}
            _ = next_change(&mut sources.custom_state) => {}
            _ = next_change(&mut sources.cvc_complete) => {}
        }
    }

    fn refresh(&mut self) {
        let next = self.compute();
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}

/// Publishes the primary button state (`None` while hidden) as its inputs change.
pub struct PrimaryButtonInteractor {
    state: watch::Receiver<Option<PrimaryButtonUiState>>,
    driver: DriverHandle,
}

impl PrimaryButtonInteractor {
    pub fn new(
        flow: ButtonFlow,
        resolver: PrimaryButtonStateResolver,
        sources: PrimaryButtonSources,
    ) -> Self {
        let mut reactor = ButtonReactor {
            sources,
            resolver,
            flow,
            state: watch::channel(None).0,
        };
        let initial = reactor.compute();
        let (state_tx, state) = watch::channel(initial);
        reactor.state = state_tx;

        Self {
            state,
            driver: driver::spawn_driver(reactor),
        }
    }

    pub fn state(&self) -> Option<PrimaryButtonUiState> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<PrimaryButtonUiState>> {
        self.state.clone()
    }

    pub async fn flush(&self) -> Result<()> {
        self.driver.flush().await
    }

    pub fn close(&self) {
        self.driver.close();
    }
}
