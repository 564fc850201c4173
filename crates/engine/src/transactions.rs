//! Transaction primitives.
//!
//! A `Transaction` is an expense paid by its creator and split equally
//! among an ordered list of participants. Once stored it is never changed.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use super::transaction_participants;

/// The share a single participant owes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: i32,
    pub amount_minor: i64,
}

/// A transaction that has not been stored yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub creator_id: i32,
    pub amount_minor: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<Participant>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i32,
    pub creator_id: i32,
    pub amount_minor: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<Participant>,
}

impl Transaction {
    /// Attach the identifier assigned by the repository.
    pub fn from_new(id: i32, tx: NewTransaction) -> Self {
        Self {
            id,
            creator_id: tx.creator_id,
            amount_minor: tx.amount_minor,
            description: tx.description,
            created_at: tx.created_at,
            participants: tx.participants,
        }
    }

    /// Sum of the shares owed by the participants.
    ///
    /// Never greater than `amount_minor`; smaller when the split left a
    /// remainder.
    pub fn allocated_minor(&self) -> i64 {
        self.participants.iter().map(|p| p.amount_minor).sum()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub creator_id: i32,
    pub amount_minor: i64,
    pub description: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transaction_participants::Entity")]
    Participants,
}

impl Related<super::transaction_participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&NewTransaction> for ActiveModel {
    fn from(tx: &NewTransaction) -> Self {
        Self {
            id: ActiveValue::NotSet,
            creator_id: ActiveValue::Set(tx.creator_id),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            description: ActiveValue::Set(tx.description.clone()),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl From<(Model, Vec<transaction_participants::Model>)> for Transaction {
    fn from((model, mut participants): (Model, Vec<transaction_participants::Model>)) -> Self {
        participants.sort_by_key(|p| p.position);
        Self {
            id: model.id,
            creator_id: model.creator_id,
            amount_minor: model.amount_minor,
            description: model.description,
            created_at: model.created_at,
            participants: participants
                .into_iter()
                .map(|p| Participant {
                    user_id: p.user_id,
                    amount_minor: p.amount_minor,
                })
                .collect(),
        }
    }
}
