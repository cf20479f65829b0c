use std::fmt::{Debug, Display, Formatter};

use brocante_payment_engine::db_types::{ItemId, ItemStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

// The passphrase must never end up in a log line.
impl Debug for LoginRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "LoginRequest {{ password: ***** }}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Body for the admin moderation call. `status` may only be `approved` or `rejected`; the API layer rejects
/// anything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationRequest {
    pub item_id: ItemId,
    pub status: ItemStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingUpdateRequest {
    pub key: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutParams {
    pub order_id: String,
}
