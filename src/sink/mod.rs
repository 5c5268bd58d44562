use crate::models::{PresentationState, ReadingDisplay};
use async_trait::async_trait;
use log::info;
use std::sync::Mutex;

/// Snapshot of the last-rendered projection, read back from the sink.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentData {
    pub temperature: String,
    pub unit: String,
    pub last_update: String,
}

impl Default for CurrentData {
    fn default() -> Self {
        let display = ReadingDisplay::default();
        Self {
            temperature: display.temperature,
            unit: display.unit,
            last_update: display.last_update,
        }
    }
}

impl From<&ReadingDisplay> for CurrentData {
    fn from(display: &ReadingDisplay) -> Self {
        Self {
            temperature: display.temperature.clone(),
            unit: display.unit.clone(),
            last_update: display.last_update.clone(),
        }
    }
}

/// The display surface the fetcher projects outcomes into: three mutually
/// exclusive regions (loading / error / info). Implementations keep the
/// info fields readable after the region is hidden, matching how a page
/// keeps its text nodes when an element is not displayed.
#[async_trait]
pub trait PresentationSink: Send + Sync {
    /// One-time readiness gate awaited before the first fetch cycle.
    /// Sinks that are ready as soon as they exist use the default.
    async fn wait_ready(&self) {}

    fn show_loading(&self);

    fn show_error(&self);

    fn show_reading(&self, display: &ReadingDisplay);

    /// Last-rendered info fields. Pure read, unaffected by the loading and
    /// error regions becoming visible.
    fn current(&self) -> CurrentData;
}

/// Sink for the binary: renders the visible region to stdout.
#[derive(Default)]
pub struct ConsoleSink {
    current: Mutex<CurrentData>,
}

impl PresentationSink for ConsoleSink {
    fn show_loading(&self) {
        println!("Loading temperature...");
    }

    fn show_error(&self) {
        println!("Temperature is currently unavailable.");
    }

    fn show_reading(&self, display: &ReadingDisplay) {
        println!(
            "{} {} (last update: {})",
            display.temperature, display.unit, display.last_update
        );
        info!(
            "Rendered reading: {} {} at {}",
            display.temperature, display.unit, display.last_update
        );
        *self.current.lock().unwrap() = CurrentData::from(display);
    }

    fn current(&self) -> CurrentData {
        self.current.lock().unwrap().clone()
    }
}

/// Recording sink: keeps the full state history. Used by tests and anywhere
/// a headless projection is needed.
#[derive(Default)]
pub struct MemorySink {
    states: Mutex<Vec<PresentationState>>,
    current: Mutex<CurrentData>,
}

impl MemorySink {
    pub fn states(&self) -> Vec<PresentationState> {
        self.states.lock().unwrap().clone()
    }

    pub fn last_state(&self) -> Option<PresentationState> {
        self.states.lock().unwrap().last().cloned()
    }
}

impl PresentationSink for MemorySink {
    fn show_loading(&self) {
        self.states.lock().unwrap().push(PresentationState::Loading);
    }

    fn show_error(&self) {
        self.states.lock().unwrap().push(PresentationState::Error);
    }

    fn show_reading(&self, display: &ReadingDisplay) {
        *self.current.lock().unwrap() = CurrentData::from(display);
        self.states
            .lock()
            .unwrap()
            .push(PresentationState::Success(display.clone()));
    }

    fn current(&self) -> CurrentData {
        self.current.lock().unwrap().clone()
    }
}
