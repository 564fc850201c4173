use std::sync::Arc;

use sea_orm::{DatabaseConnection, DatabaseTransaction, prelude::*};

use crate::{
    EngineError, ResultEngine,
    repository::{SqlTransactionRepository, TransactionRepository},
};

mod balances;
mod debts;
mod groups;
mod transactions;
mod users;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

pub struct Engine {
    database: DatabaseConnection,
    transactions: Arc<dyn TransactionRepository>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: i32,
    ) -> ResultEngine<crate::users::Model> {
        crate::users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("user".to_string()))
    }

    async fn require_group(
        &self,
        db: &DatabaseTransaction,
        group_id: i32,
    ) -> ResultEngine<crate::groups::Model> {
        crate::groups::Entity::find_by_id(group_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("group".to_string()))
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    transactions: Option<Arc<dyn TransactionRepository>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Replace the SQL-backed transaction storage.
    pub fn transaction_repository(mut self, repo: Arc<dyn TransactionRepository>) -> EngineBuilder {
        self.transactions = Some(repo);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let transactions = match self.transactions {
            Some(repo) => repo,
            None => Arc::new(SqlTransactionRepository::new(self.database.clone())),
        };

        Ok(Engine {
            database: self.database,
            transactions,
        })
    }
}
