pub(crate) mod reading;

pub use reading::{ReadingDisplay, SensorReading, PLACEHOLDER};

/// The three mutually exclusive display states driven by fetch outcomes.
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationState {
    Loading,
    Success(ReadingDisplay),
    Error,
}
