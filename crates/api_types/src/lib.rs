//! JSON bodies exchanged by the HTTP API.
//!
//! Amounts are integers in minor units (for example cents).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Wrapper around every `/api/v1` response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: None,
            data: Some(data),
            error: None,
        }
    }

    /// Success carrying both a message and data, used for writes.
    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: Some(message.into()),
            data: Some(data),
            error: None,
        }
    }
}

impl Envelope<()> {
    /// Success with only a message, used for deletions.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: Some(message.into()),
            data: None,
            error: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: None,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub name: String,
        pub email: String,
    }

    /// Partial update: absent fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserUpdate {
        pub name: Option<String>,
        pub email: Option<String>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct User {
        pub id: i32,
        pub name: String,
        pub email: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod group {
    use super::*;
    use crate::user::User;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
        pub description: Option<String>,
        /// Id of the creating user, recorded as the first member.
        pub created_by: i32,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct GroupUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Group {
        pub id: i32,
        pub name: String,
        pub description: Option<String>,
        pub created_by: i32,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        /// Omitted in list responses.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub members: Option<Vec<User>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberAdd {
        pub user_id: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupSummary {
        pub group_id: i32,
        pub group_name: String,
        /// Sum of the active debts.
        pub total_debts: i64,
        pub active_debts: u64,
        pub settled_debts: u64,
        pub member_count: u64,
    }
}

pub mod debt {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DebtStatus {
        Active,
        Settled,
        Cancelled,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DebtNew {
        pub group_id: i32,
        pub from_user_id: i32,
        pub to_user_id: i32,
        /// Must be > 0.
        pub amount: i64,
        pub description: Option<String>,
    }

    /// Partial update. `status` is one of `active`, `settled`, `cancelled`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DebtUpdate {
        pub amount: Option<i64>,
        pub description: Option<String>,
        pub status: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Debt {
        pub id: i32,
        pub group_id: i32,
        pub from_user_id: i32,
        pub to_user_id: i32,
        pub amount: i64,
        pub description: Option<String>,
        pub status: DebtStatus,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        pub settled_at: Option<DateTime<Utc>>,
    }

    /// Query string of `GET /debts`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DebtQuery {
        pub group_id: Option<i32>,
        /// Matches either side of the debt.
        pub user_id: Option<i32>,
        pub status: Option<String>,
    }

    /// Query string of `GET /users/{id}/balance`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BalanceQuery {
        pub group_id: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DebtSummary {
        pub user_id: i32,
        pub user_name: String,
        pub total_owed: i64,
        pub total_owed_to: i64,
        /// `total_owed_to - total_owed`.
        pub net_balance: i64,
    }
}

pub mod transaction {
    use super::*;

    /// Equal split request: every participant owes `amount / participants.len()`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub creator_id: i32,
        pub amount: i64,
        pub participants: Vec<i32>,
        #[serde(default)]
        pub description: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Participant {
        pub user_id: i32,
        pub amount: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Transaction {
        pub id: i32,
        pub creator_id: i32,
        pub amount: i64,
        pub description: String,
        pub created_at: DateTime<Utc>,
        pub participants: Vec<Participant>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_skips_empty_fields() {
        let body = serde_json::to_value(Envelope::success(json!({"id": 1}))).unwrap();
        assert_eq!(body, json!({"status": "success", "data": {"id": 1}}));
    }

    #[test]
    fn message_and_error_envelopes() {
        let body = serde_json::to_value(Envelope::message("User deleted successfully")).unwrap();
        assert_eq!(
            body,
            json!({"status": "success", "message": "User deleted successfully"})
        );

        let body = serde_json::to_value(Envelope::error("user not found")).unwrap();
        assert_eq!(body, json!({"status": "error", "error": "user not found"}));
    }

    #[test]
    fn transaction_description_defaults_to_empty() {
        let tx: transaction::TransactionNew = serde_json::from_value(json!({
            "creator_id": 1,
            "amount": 100,
            "participants": [1, 2, 3]
        }))
        .unwrap();
        assert_eq!(tx.description, "");
        assert_eq!(tx.participants, vec![1, 2, 3]);
    }

    #[test]
    fn partial_updates_accept_empty_objects() {
        let update: user::UserUpdate = serde_json::from_value(json!({})).unwrap();
        assert!(update.name.is_none() && update.email.is_none());

        let update: debt::DebtUpdate = serde_json::from_value(json!({"status": "settled"})).unwrap();
        assert_eq!(update.status.as_deref(), Some("settled"));
        assert!(update.amount.is_none());
    }
}
