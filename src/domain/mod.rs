//! Pure domain model: payment options, selection rules and the ports the
//! interactors talk to.

pub mod amount;
pub mod catalog;
pub mod payment_option;
pub mod ports;
pub mod primary_button;
pub mod screen;
pub mod selection;
pub mod strings;
pub mod wallets;
