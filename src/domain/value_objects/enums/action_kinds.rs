use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Usage,
    Addition,
    PlanUpgrade,
    ChatbotOpened,
    MessageSent,
    MessageReceived,
    InviteIssued,
    InviteRedeemed,
    Other,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Usage => "usage",
            ActionKind::Addition => "addition",
            ActionKind::PlanUpgrade => "plan_upgrade",
            ActionKind::ChatbotOpened => "chatbot_opened",
            ActionKind::MessageSent => "message_sent",
            ActionKind::MessageReceived => "message_received",
            ActionKind::InviteIssued => "invite_issued",
            ActionKind::InviteRedeemed => "invite_redeemed",
            ActionKind::Other => "other",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "usage" => ActionKind::Usage,
            "addition" => ActionKind::Addition,
            "plan_upgrade" => ActionKind::PlanUpgrade,
            "chatbot_opened" => ActionKind::ChatbotOpened,
            "message_sent" => ActionKind::MessageSent,
            "message_received" => ActionKind::MessageReceived,
            "invite_issued" => ActionKind::InviteIssued,
            "invite_redeemed" => ActionKind::InviteRedeemed,
            _ => ActionKind::Other,
        }
    }
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
