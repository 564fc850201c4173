//! Persistence of split transactions.
//!
//! The engine talks to transaction storage through [`TransactionRepository`]
//! so the split logic can be exercised without a database.
//! [`SqlTransactionRepository`] is the implementation backed by the
//! relational store.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use sea_orm::{
    ActiveValue, Condition, DatabaseConnection, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};

use crate::{
    EngineError, ResultEngine, ops::with_tx, transaction_participants,
    transactions::{self, NewTransaction, Transaction},
    users,
};

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Store a transaction with its participants, returning the new id.
    async fn create(&self, tx: &NewTransaction) -> ResultEngine<i32>;

    /// Look up a transaction by id.
    async fn get_by_id(&self, id: i32) -> ResultEngine<Option<Transaction>>;

    /// Transactions created by `user_id` or listing it as a participant,
    /// newest first.
    async fn list_by_user(&self, user_id: i32) -> ResultEngine<Vec<Transaction>>;
}

#[derive(Debug, Clone)]
pub struct SqlTransactionRepository {
    database: DatabaseConnection,
}

impl SqlTransactionRepository {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

async fn load_participants<C: ConnectionTrait>(
    db: &C,
    transaction_ids: Vec<i32>,
) -> ResultEngine<HashMap<i32, Vec<transaction_participants::Model>>> {
    let rows = transaction_participants::Entity::find()
        .filter(transaction_participants::Column::TransactionId.is_in(transaction_ids))
        .order_by_asc(transaction_participants::Column::TransactionId)
        .order_by_asc(transaction_participants::Column::Position)
        .all(db)
        .await?;

    let mut by_transaction: HashMap<i32, Vec<transaction_participants::Model>> = HashMap::new();
    for row in rows {
        by_transaction.entry(row.transaction_id).or_default().push(row);
    }
    Ok(by_transaction)
}

#[async_trait]
impl TransactionRepository for SqlTransactionRepository {
    async fn create(&self, tx: &NewTransaction) -> ResultEngine<i32> {
        with_tx!(self, |db_tx| {
            let referenced: BTreeSet<i32> = std::iter::once(tx.creator_id)
                .chain(tx.participants.iter().map(|p| p.user_id))
                .collect();
            let known: BTreeSet<i32> = users::Entity::find()
                .filter(users::Column::Id.is_in(referenced.iter().copied()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|user| user.id)
                .collect();
            if let Some(missing) = referenced.difference(&known).next() {
                return Err(EngineError::NotFound(format!("user {missing}")));
            }

            let model = transactions::ActiveModel::from(tx).insert(&db_tx).await?;

            for (position, participant) in tx.participants.iter().enumerate() {
                transaction_participants::ActiveModel {
                    transaction_id: ActiveValue::Set(model.id),
                    position: ActiveValue::Set(position as i32),
                    user_id: ActiveValue::Set(participant.user_id),
                    amount_minor: ActiveValue::Set(participant.amount_minor),
                }
                .insert(&db_tx)
                .await?;
            }

            Ok(model.id)
        })
    }

    async fn get_by_id(&self, id: i32) -> ResultEngine<Option<Transaction>> {
        let Some(model) = transactions::Entity::find_by_id(id)
            .one(&self.database)
            .await?
        else {
            return Ok(None);
        };

        let participants = transaction_participants::Entity::find()
            .filter(transaction_participants::Column::TransactionId.eq(id))
            .order_by_asc(transaction_participants::Column::Position)
            .all(&self.database)
            .await?;

        Ok(Some(Transaction::from((model, participants))))
    }

    async fn list_by_user(&self, user_id: i32) -> ResultEngine<Vec<Transaction>> {
        let involved: Vec<i32> = transaction_participants::Entity::find()
            .filter(transaction_participants::Column::UserId.eq(user_id))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|p| p.transaction_id)
            .collect();

        let models = transactions::Entity::find()
            .filter(
                Condition::any()
                    .add(transactions::Column::CreatorId.eq(user_id))
                    .add(transactions::Column::Id.is_in(involved)),
            )
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .all(&self.database)
            .await?;

        let mut participants =
            load_participants(&self.database, models.iter().map(|m| m.id).collect()).await?;

        Ok(models
            .into_iter()
            .map(|model| {
                let rows = participants.remove(&model.id).unwrap_or_default();
                Transaction::from((model, rows))
            })
            .collect())
    }
}
