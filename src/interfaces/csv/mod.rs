pub mod event_reader;
pub mod instrument_reader;
