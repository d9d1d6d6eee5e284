use interaction_flow::{Context, GraphError, Result};

use super::session_keys;
use crate::models::{InteractionRequest, Notice};

pub async fn load_request(context: &Context) -> Result<InteractionRequest> {
    context
        .get(session_keys::REQUEST)
        .await
        .ok_or_else(|| GraphError::ContextError("request not found in context".to_string()))
}

pub async fn push_notice(context: &Context, notice: Notice) -> Result<()> {
    context.append(session_keys::NOTICES, notice).await
}
