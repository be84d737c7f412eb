//! Advisory warning sinks
//!
//! Schema/access mismatches are backward-compatibility notices, not errors:
//! old integration code keeps working, just noisily. The resolver emits them
//! through an injected [`WarnSink`] so the engine carries no global logging
//! state and tests can capture notices directly.

use std::sync::Mutex;

/// Destination for mismatch notices
pub trait WarnSink: Send + Sync {
    fn warn(&self, message: &str);
}

/// Forwards notices to the `tracing` subscriber at WARN level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl WarnSink for TracingSink {
    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }
}

/// Records notices in memory for later inspection
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all notices received so far, in emission order
    pub fn messages(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop all recorded notices
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        match self.messages.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl WarnSink for MemorySink {
    fn warn(&self, message: &str) {
        self.lock().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.warn("first");
        sink.warn("second");
        assert_eq!(sink.messages(), vec!["first", "second"]);
    }

    #[test]
    fn memory_sink_clear() {
        let sink = MemorySink::new();
        sink.warn("notice");
        sink.clear();
        assert!(sink.is_empty());
    }
}
