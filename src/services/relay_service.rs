use crate::models::{ChartView, ChatMessage, Role};
use crate::services::extract_service::{extract_chart, Extraction};
use crate::services::render_service::render;
use crate::utils::errors::{ChartError, PayloadError};

/// What to do with one incoming chat message
#[derive(Debug, Clone, PartialEq)]
pub enum RelayOutcome {
    /// Draw this view; `residual` is the assistant's prose without the payload
    Chart { view: ChartView, residual: String },
    /// Not an assistant message, or no chart in it
    Ignored,
    /// The assistant tried to send a chart but it could not be used
    Malformed(PayloadError),
}

/// Role of a message author on the chat transport
///
/// Returns `None` for our own messages. Bots count as assistants when they are
/// listed in `assistant_ids`, or when that list is empty.
pub fn role_for_author(author_id: u64, is_bot: bool, own_id: u64, assistant_ids: &[u64]) -> Option<Role> {
    if author_id == own_id {
        return None;
    }
    if is_bot && (assistant_ids.is_empty() || assistant_ids.contains(&author_id)) {
        Some(Role::Assistant)
    } else {
        Some(Role::User)
    }
}

/// Run one message through extraction and rendering
pub fn process_message(message: &ChatMessage) -> Result<RelayOutcome, ChartError> {
    if !message.is_assistant() {
        return Ok(RelayOutcome::Ignored);
    }

    match extract_chart(&message.content) {
        Extraction::Found { payload, residual } => Ok(RelayOutcome::Chart {
            view: render(&payload)?,
            residual,
        }),
        Extraction::NotFound => Ok(RelayOutcome::Ignored),
        Extraction::Malformed { reason } => Ok(RelayOutcome::Malformed(reason)),
    }
}
