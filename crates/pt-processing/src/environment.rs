//! Host supplied context passed through to processors
//!
//! The processor keeps these around for its own use; the dispatch layer never
//! looks inside them.

use tracing::Span;

/// Describes the application hosting the processor
pub trait ApplicationEnvironment: Send + Sync {
    fn application_name(&self) -> &str;

    fn runtime_name(&self) -> &str;

    /// Whether a user can be prompted during processing
    fn is_interactive(&self) -> bool {
        false
    }
}

/// Per-processor context provided by the host
pub trait ProcessorEnvironment: Send + Sync {
    /// Name the processor is registered under
    fn processor_name(&self) -> &str;

    /// Span that processor logging should be recorded under
    fn span(&self) -> Span {
        tracing::info_span!("processor", name = self.processor_name())
    }
}

/// Application environment with fixed values
#[derive(Debug, Clone)]
pub struct StaticApplicationEnvironment {
    pub application_name: String,
    pub runtime_name: String,
    pub interactive: bool,
}

impl StaticApplicationEnvironment {
    pub fn new(application_name: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
            runtime_name: "headless".to_string(),
            interactive: false,
        }
    }
}

impl ApplicationEnvironment for StaticApplicationEnvironment {
    fn application_name(&self) -> &str {
        &self.application_name
    }

    fn runtime_name(&self) -> &str {
        &self.runtime_name
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Processor environment that only carries a name
#[derive(Debug, Clone)]
pub struct DefaultProcessorEnvironment {
    name: String,
}

impl DefaultProcessorEnvironment {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ProcessorEnvironment for DefaultProcessorEnvironment {
    fn processor_name(&self) -> &str {
        &self.name
    }
}
