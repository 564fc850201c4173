use chrono::Utc;
use sea_orm::{
    ActiveValue, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};

use crate::{
    EngineError, ResultEngine, User, transaction_participants, transactions, users,
    validation::{validate_email, validate_user_name},
};

use super::{Engine, with_tx};

const EMAIL_TAKEN: &str = "user with this email already exists";

impl Engine {
    /// Create a user after checking name, email format and email uniqueness.
    pub async fn new_user(&self, name: &str, email: &str) -> ResultEngine<User> {
        validate_user_name(name)?;
        validate_email(email)?;

        with_tx!(self, |db_tx| {
            let taken = users::Entity::find()
                .filter(users::Column::Email.eq(email))
                .one(&db_tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::Conflict(EMAIL_TAKEN.to_string()));
            }

            let now = Utc::now();
            let model = users::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name.to_string()),
                email: ActiveValue::Set(email.to_string()),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await
            .map_err(|err| EngineError::conflict_on_unique(err, EMAIL_TAKEN))?;

            Ok(User::from(model))
        })
    }

    pub async fn user(&self, user_id: i32) -> ResultEngine<User> {
        users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| EngineError::NotFound("user".to_string()))
    }

    pub async fn user_by_email(&self, email: &str) -> ResultEngine<User> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| EngineError::NotFound("user".to_string()))
    }

    /// All users, newest first.
    pub async fn users(&self) -> ResultEngine<Vec<User>> {
        let models = users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .order_by_desc(users::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(User::from).collect())
    }

    /// Partially update a user. Omitted fields keep their value; the email
    /// uniqueness check only runs when the email actually changes.
    pub async fn update_user(
        &self,
        user_id: i32,
        name: Option<&str>,
        email: Option<&str>,
    ) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let existing = self.require_user(&db_tx, user_id).await?;

            if let Some(name) = name {
                validate_user_name(name)?;
            }
            if let Some(email) = email {
                validate_email(email)?;
                if email != existing.email {
                    let taken = users::Entity::find()
                        .filter(users::Column::Email.eq(email))
                        .one(&db_tx)
                        .await?
                        .is_some();
                    if taken {
                        return Err(EngineError::Conflict(EMAIL_TAKEN.to_string()));
                    }
                }
            }

            let mut active: users::ActiveModel = existing.into();
            if let Some(name) = name {
                active.name = ActiveValue::Set(name.to_string());
            }
            if let Some(email) = email {
                active.email = ActiveValue::Set(email.to_string());
            }
            active.updated_at = ActiveValue::Set(Utc::now());

            let model = active
                .update(&db_tx)
                .await
                .map_err(|err| EngineError::conflict_on_unique(err, EMAIL_TAKEN))?;

            Ok(User::from(model))
        })
    }

    /// Hard delete. Memberships, debts, created groups and created
    /// transactions go with the user through the foreign keys. Fails with
    /// `Conflict` while the user holds a share in a transaction created by
    /// someone else.
    pub async fn delete_user(&self, user_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            let shares = transaction_participants::Entity::find()
                .join(
                    JoinType::InnerJoin,
                    transaction_participants::Relation::Transactions.def(),
                )
                .filter(transaction_participants::Column::UserId.eq(user_id))
                .filter(transactions::Column::CreatorId.ne(user_id))
                .count(&db_tx)
                .await?;
            if shares > 0 {
                return Err(EngineError::Conflict(
                    "user participates in transactions of other users".to_string(),
                ));
            }

            users::Entity::delete_by_id(user_id).exec(&db_tx).await?;
            Ok(())
        })
    }
}
