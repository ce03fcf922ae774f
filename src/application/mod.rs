//! Application layer: the interactors that turn upstream signals into published
//! UI state.
//!
//! Every interactor owns a background `tokio` task fed by `watch` channels. Each
//! recomputation reads the latest value of all of its inputs, so a published value
//! never mixes old and new inputs.

pub mod aggregator;
mod driver;
pub mod edit_session;
pub mod layout;
pub mod primary_button;
