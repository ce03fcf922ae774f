//! Outer adapters: CSV scenario input, JSON lines output and the replay session
//! that drives the interactors from them.

pub mod csv;
pub mod json;
pub mod replay;
