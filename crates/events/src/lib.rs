#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Lifecycle events for driveline
//!
//! A built console driver reports what it does through an optional event
//! channel registered in its container. Events are grouped by domain:
//!
//! - **Host**: run starting and stopping, services disposed
//! - **Driver**: each driver started, completed, or failed
//! - **General**: warnings, errors, and debug notes
//!
//! Every event travels with [`EventMeta`] so consumers can correlate a run.

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{AppEvent, DriverEvent, FailureContext, GeneralEvent, HostEvent};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// An event with its metadata
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    #[must_use]
    pub fn new(meta: EventMeta, event: AppEvent) -> Self {
        Self { meta, event }
    }

    /// Wrap an event with metadata derived from its domain and level
    #[must_use]
    pub fn from_event(event: AppEvent) -> Self {
        let meta = EventMeta::new(event.level(), event.source());
        Self { meta, event }
    }
}

pub type EventSender = UnboundedSender<EventMessage>;

pub type EventReceiver = UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// Single API for emitting events, from a raw sender or anything holding one.
///
/// Emission never fails: a dropped receiver only means nobody is listening.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Correlation id stamped on every emitted event
    fn correlation_id(&self) -> Option<&str> {
        None
    }

    /// Emit an event with explicit metadata
    fn emit_with_meta(&self, meta: EventMeta, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            let _ = sender.send(EventMessage::new(meta, event));
        }
    }

    /// Emit an event, deriving metadata from the event itself
    fn emit(&self, event: AppEvent) {
        let mut meta = EventMeta::new(event.level(), event.source());
        if let Some(id) = self.correlation_id() {
            meta = meta.with_correlation_id(id);
        }
        self.emit_with_meta(meta, event);
    }

    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    fn emit_error(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error(message)));
    }

    fn emit_host_starting(&self, drivers: usize) {
        self.emit(AppEvent::Host(HostEvent::starting(drivers)));
    }

    fn emit_host_stopped(&self, exit_code: i32) {
        self.emit(AppEvent::Host(HostEvent::stopped(exit_code)));
    }

    fn emit_host_disposed(&self) {
        self.emit(AppEvent::Host(HostEvent::Disposed));
    }

    fn emit_driver_started(&self, driver: impl Into<String>, index: usize) {
        self.emit(AppEvent::Driver(DriverEvent::started(driver, index)));
    }

    fn emit_driver_completed(&self, driver: impl Into<String>, exit_code: i32) {
        self.emit(AppEvent::Driver(DriverEvent::completed(driver, exit_code)));
    }

    fn emit_driver_failed<E: driveline_errors::UserFacingError + ?Sized>(
        &self,
        driver: impl Into<String>,
        error: &E,
    ) {
        self.emit(AppEvent::Driver(DriverEvent::failed(
            driver,
            FailureContext::from_error(error),
        )));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

/// A sender paired with the correlation id of one run
#[derive(Debug, Clone)]
pub struct CorrelatedEmitter {
    sender: Option<EventSender>,
    correlation_id: String,
}

impl CorrelatedEmitter {
    /// Emitter with a fresh correlation id; `None` discards every event
    #[must_use]
    pub fn new(sender: Option<EventSender>) -> Self {
        Self {
            sender,
            correlation_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

impl EventEmitter for CorrelatedEmitter {
    fn event_sender(&self) -> Option<&EventSender> {
        self.sender.as_ref()
    }

    fn correlation_id(&self) -> Option<&str> {
        Some(&self.correlation_id)
    }
}
