use std::sync::Arc;

use crate::llm_client::ChatProvider;
use crate::resume::ResumeText;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Completion backend. `GroqClient` in production, a stub in tests.
    pub provider: Arc<dyn ChatProvider>,
    /// Resume text, fully loaded before the listener is bound. Read-only afterwards.
    pub resume: Arc<ResumeText>,
}
