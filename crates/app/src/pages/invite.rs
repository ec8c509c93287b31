//! Invite acceptance: one attempt on open, three terminal states, no retry.

use serde::Serialize;

use parallax_backend::BackendClient;
use parallax_services::users;

pub const INVALID_INVITE: &str = "Invalid or expired invite";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum InviteState {
    Processing,
    Accepted,
    Failed(String),
}

impl InviteState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, InviteState::Processing)
    }
}

/// Accept the invite behind `token`.
pub async fn accept(client: &BackendClient, token: &str) -> InviteState {
    let response = users::accept_invite(client, token).await;
    match response.error {
        None => {
            tracing::info!("invite accepted");
            InviteState::Accepted
        }
        Some(message) if !message.trim().is_empty() => InviteState::Failed(message),
        Some(_) => InviteState::Failed(INVALID_INVITE.to_string()),
    }
}
