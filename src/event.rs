use crate::backend::BackendState;

/// Events delivered from background tasks into the egui loop.
#[derive(Debug, Clone)]
pub enum AppEvent {
    AssistantReply {
        query: String,
        category: String,
        response: String,
    },
    BackendStatus(BackendState),
}
