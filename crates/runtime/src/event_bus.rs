use std::collections::VecDeque;
use std::fmt;

use crate::frame::Frame;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
}

/// One lifecycle diagnostic, stamped with the frame it happened on.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub frame_index: u64,
    pub elapsed_s: f64,
    pub severity: Severity,
    pub kind: &'static str,
    pub message: String,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[#{} {:.2}s] {}: {}",
            self.frame_index, self.elapsed_s, self.kind, self.message
        )
    }
}

/// Bounded queue of diagnostics for the host to drain.
///
/// When the host never drains, the oldest entries are dropped once
/// `capacity` is reached.
#[derive(Debug)]
pub struct EventBus {
    events: VecDeque<Event>,
    capacity: usize,
    dropped: u64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(256)
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    pub fn info(&mut self, frame: Frame, kind: &'static str, message: impl Into<String>) {
        self.push(frame, Severity::Info, kind, message.into());
    }

    pub fn warn(&mut self, frame: Frame, kind: &'static str, message: impl Into<String>) {
        self.push(frame, Severity::Warn, kind, message.into());
    }

    fn push(&mut self, frame: Frame, severity: Severity, kind: &'static str, message: String) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(Event {
            frame_index: frame.index,
            elapsed_s: frame.time.seconds(),
            severity,
            kind,
            message,
        });
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn has_kind(&self, kind: &str) -> bool {
        self.events.iter().any(|e| e.kind == kind)
    }

    /// Entries lost to the capacity bound since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn drain(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }
}
