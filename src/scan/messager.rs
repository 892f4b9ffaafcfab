/// Sink for the human-readable notes a round produces.
pub trait Messager {
    fn note(&mut self, message: &str);
}

/// Forwards notes to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMessager;

impl Messager for TracingMessager {
    fn note(&mut self, message: &str) {
        tracing::info!(target: "stubgen::diagnostics", "{message}");
    }
}

/// Keeps every note in order.
#[derive(Debug, Default, Clone)]
pub struct CollectingMessager {
    pub notes: Vec<String>,
}

impl Messager for CollectingMessager {
    fn note(&mut self, message: &str) {
        tracing::debug!(target: "stubgen::diagnostics", "{message}");
        self.notes.push(message.to_string());
    }
}
