//! Debts between members of a group.
//!
//! A debt is a directed obligation: `from_user_id` owes `amount_minor` to
//! `to_user_id`. Amounts are integer minor units and always positive.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    #[default]
    Active,
    Settled,
    Cancelled,
}

impl DebtStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Settled => "settled",
            Self::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<&str> for DebtStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "settled" => Ok(Self::Settled),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::Validation(format!(
                "invalid debt status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    pub id: i32,
    pub group_id: i32,
    pub from_user_id: i32,
    pub to_user_id: i32,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub status: DebtStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

/// Input for recording a new debt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewDebt {
    pub group_id: i32,
    pub from_user_id: i32,
    pub to_user_id: i32,
    pub amount_minor: i64,
    pub description: Option<String>,
}

/// Partial update of a debt. `None` keeps the stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DebtChanges {
    pub amount_minor: Option<i64>,
    pub description: Option<String>,
    pub status: Option<DebtStatus>,
}

/// Optional filters for listing debts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DebtFilter {
    pub group_id: Option<i32>,
    /// Matches debts where the user is either debtor or creditor.
    pub user_id: Option<i32>,
    pub status: Option<DebtStatus>,
}

/// Position of a user across the active debts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtSummary {
    pub user_id: i32,
    pub user_name: String,
    /// What the user owes to others.
    pub total_owed_minor: i64,
    /// What others owe to the user.
    pub total_owed_to_minor: i64,
    /// `total_owed_to_minor - total_owed_minor`: positive when the user is
    /// owed money.
    pub net_balance_minor: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "debts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub group_id: i32,
    pub from_user_id: i32,
    pub to_user_id: i32,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub settled_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Groups,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::FromUserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    FromUser,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ToUserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    ToUser,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&NewDebt> for ActiveModel {
    fn from(debt: &NewDebt) -> Self {
        let now = Utc::now();
        Self {
            id: ActiveValue::NotSet,
            group_id: ActiveValue::Set(debt.group_id),
            from_user_id: ActiveValue::Set(debt.from_user_id),
            to_user_id: ActiveValue::Set(debt.to_user_id),
            amount_minor: ActiveValue::Set(debt.amount_minor),
            description: ActiveValue::Set(debt.description.clone()),
            status: ActiveValue::Set(DebtStatus::Active.as_str().to_string()),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            settled_at: ActiveValue::Set(None),
        }
    }
}

impl TryFrom<Model> for Debt {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            group_id: model.group_id,
            from_user_id: model.from_user_id,
            to_user_id: model.to_user_id,
            amount_minor: model.amount_minor,
            description: model.description,
            status: DebtStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
            updated_at: model.updated_at,
            settled_at: model.settled_at,
        })
    }
}
