use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const KIND_UC: &str = "uc";
pub const KIND_BUNDLE: &str = "bundle";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub customer_name: String,
    pub player_id: String,
    pub contact_email: String,
    pub kind: String,
    pub uc_amount: Option<i32>,
    pub bundle_name: Option<String>,
    pub product_id: Option<Uuid>,
    /// Client-supplied decimal-as-text; never cross-checked against the
    /// catalog price.
    pub total_amount: String,
    pub transaction_id: String,
    pub screenshot_url: Option<String>,
    pub status: String,
    pub owner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub uc_amount: Option<i32>,
    /// Minor currency units.
    pub price: i64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Inquiry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Suggestion {
    pub id: Uuid,
    pub name: String,
    pub contact: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

pub mod inquiry_status {
    pub const PENDING: &str = "pending";
    pub const REPLIED: &str = "replied";
}

/// Order lifecycle. Statuses only move forward:
/// `awaiting_payment` -> (`paid` | `confirmed`) -> `delivered`, with
/// `rejected`/`cancelled` reachable from any non-terminal state.
pub mod order_status {
    pub const AWAITING_PAYMENT: &str = "awaiting_payment";
    pub const PAID: &str = "paid";
    pub const CONFIRMED: &str = "confirmed";
    pub const DELIVERED: &str = "delivered";
    pub const REJECTED: &str = "rejected";
    pub const CANCELLED: &str = "cancelled";

    pub const ALL: [&str; 6] = [
        AWAITING_PAYMENT,
        PAID,
        CONFIRMED,
        DELIVERED,
        REJECTED,
        CANCELLED,
    ];

    pub fn is_known(status: &str) -> bool {
        ALL.contains(&status)
    }

    pub fn is_terminal(status: &str) -> bool {
        matches!(status, DELIVERED | REJECTED | CANCELLED)
    }

    fn stage(status: &str) -> Option<u8> {
        match status {
            AWAITING_PAYMENT => Some(0),
            PAID | CONFIRMED => Some(1),
            DELIVERED => Some(2),
            _ => None,
        }
    }

    /// Whether `from -> to` is a legal forward move. Both must be known,
    /// `from` must not be terminal, and `to` must either abort the order or
    /// advance it by at least one stage.
    pub fn can_transition(from: &str, to: &str) -> bool {
        if !is_known(from) || !is_known(to) || is_terminal(from) {
            return false;
        }
        if matches!(to, REJECTED | CANCELLED) {
            return true;
        }
        match (stage(from), stage(to)) {
            (Some(a), Some(b)) => b > a,
            _ => false,
        }
    }
}
