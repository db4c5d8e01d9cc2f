use std::sync::mpsc::{self, Receiver, Sender};

use crate::{AddOnEvent, LogLevel};

/// Trait for consuming events.
///
/// Each frontend provides its own implementation.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: AddOnEvent);
}

/// Channel-based event sink.
///
/// The receiver end can be drained by any consumer (UI loop, test harness).
pub struct ChannelSink {
    sender: Sender<AddOnEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, Receiver<AddOnEvent>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender,
            },
            receiver,
        )
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: AddOnEvent) {
        let _ = self.sender.send(event);
    }
}

/// No-op event sink for headless runs.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: AddOnEvent) {}
}

/// Collector sink that stores all events for inspection.
#[derive(Default)]
pub struct CollectorSink {
    events: std::sync::Mutex<Vec<AddOnEvent>>,
}

impl CollectorSink {
    pub fn events(&self) -> Vec<AddOnEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Messages of all operator reports emitted at `level`.
    pub fn reports(&self, level: LogLevel) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| {
                match event {
                    AddOnEvent::Report {
                        level: lvl,
                        message,
                    } if *lvl == level => Some(message.clone()),
                    _ => None,
                }
            })
            .collect()
    }
}

impl EventSink for CollectorSink {
    fn emit(&self, event: AddOnEvent) {
        self.events.lock().unwrap().push(event);
    }
}
