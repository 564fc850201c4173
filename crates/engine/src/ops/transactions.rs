use chrono::Utc;

use crate::{EngineError, NewTransaction, ResultEngine, Transaction, split::equal_split};

use super::Engine;

impl Engine {
    /// Split `amount_minor` equally among `participant_ids` and store the
    /// resulting transaction.
    ///
    /// Each participant owes `amount_minor / participant_ids.len()`; the
    /// remainder is not assigned. Duplicated ids are charged once per
    /// occurrence. Nothing is stored when validation fails.
    pub async fn create_transaction(
        &self,
        creator_id: i32,
        amount_minor: i64,
        participant_ids: &[i32],
        description: &str,
    ) -> ResultEngine<Transaction> {
        let participants = equal_split(amount_minor, participant_ids)?;
        let new = NewTransaction {
            creator_id,
            amount_minor,
            description: description.to_string(),
            created_at: Utc::now(),
            participants,
        };

        let id = self.transactions.create(&new).await?;
        Ok(Transaction::from_new(id, new))
    }

    pub async fn transaction(&self, transaction_id: i32) -> ResultEngine<Transaction> {
        self.transactions
            .get_by_id(transaction_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("transaction".to_string()))
    }

    /// Transactions the user created or takes part in, newest first.
    pub async fn transactions_for_user(&self, user_id: i32) -> ResultEngine<Vec<Transaction>> {
        self.user(user_id).await?;
        self.transactions.list_by_user(user_id).await
    }
}
