use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::enums::{action_kinds::ActionKind, plan_ids::PlanId};

/// Payload of a tracked user action. Tagged by kind so known shapes stay
/// structured; the `Other` arm carries arbitrary client data for action
/// kinds introduced later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionPayload {
    Usage {
        amount: i64,
        description: String,
    },
    Addition {
        amount: i64,
        description: String,
    },
    PlanUpgrade {
        amount: i64,
        plan_id: PlanId,
        description: String,
    },
    ChatbotOpened {},
    MessageSent {
        content: String,
    },
    MessageReceived {
        response: String,
    },
    InviteIssued {
        code: String,
    },
    InviteRedeemed {
        code: String,
        issuer_user_id: Uuid,
    },
    Other {
        action: String,
        #[serde(default)]
        data: serde_json::Value,
    },
}

impl ActionPayload {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionPayload::Usage { .. } => ActionKind::Usage,
            ActionPayload::Addition { .. } => ActionKind::Addition,
            ActionPayload::PlanUpgrade { .. } => ActionKind::PlanUpgrade,
            ActionPayload::ChatbotOpened {} => ActionKind::ChatbotOpened,
            ActionPayload::MessageSent { .. } => ActionKind::MessageSent,
            ActionPayload::MessageReceived { .. } => ActionKind::MessageReceived,
            ActionPayload::InviteIssued { .. } => ActionKind::InviteIssued,
            ActionPayload::InviteRedeemed { .. } => ActionKind::InviteRedeemed,
            ActionPayload::Other { .. } => ActionKind::Other,
        }
    }
}
