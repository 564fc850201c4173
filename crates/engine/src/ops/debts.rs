use chrono::Utc;
use sea_orm::{ActiveValue, Condition, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Debt, DebtChanges, DebtFilter, DebtStatus, EngineError, NewDebt, ResultEngine, debts,
    validation::{normalize_optional_text, validate_description},
};

use super::{Engine, with_tx};

fn validate_amount(amount_minor: i64) -> ResultEngine<()> {
    if amount_minor <= 0 {
        return Err(EngineError::Validation(
            "amount must be positive".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    /// Record that `from_user_id` owes `amount_minor` to `to_user_id` inside
    /// a group. Both users must be members of the group.
    pub async fn new_debt(&self, debt: NewDebt) -> ResultEngine<Debt> {
        validate_amount(debt.amount_minor)?;
        if debt.from_user_id == debt.to_user_id {
            return Err(EngineError::Validation(
                "from_user_id and to_user_id must differ".to_string(),
            ));
        }
        validate_description(debt.description.as_deref())?;
        let debt = NewDebt {
            description: normalize_optional_text(debt.description.as_deref()),
            ..debt
        };

        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, debt.group_id).await?;
            self.require_user(&db_tx, debt.from_user_id).await?;
            self.require_user(&db_tx, debt.to_user_id).await?;

            for (label, user_id) in [("from", debt.from_user_id), ("to", debt.to_user_id)] {
                if !self.is_group_member(&db_tx, debt.group_id, user_id).await? {
                    return Err(EngineError::Validation(format!(
                        "{label} user is not a member of the group"
                    )));
                }
            }

            let model = debts::ActiveModel::from(&debt).insert(&db_tx).await?;
            Debt::try_from(model)
        })
    }

    pub async fn debt(&self, debt_id: i32) -> ResultEngine<Debt> {
        let model = debts::Entity::find_by_id(debt_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("debt".to_string()))?;
        Debt::try_from(model)
    }

    /// Debts matching `filter`, newest first.
    pub async fn debts(&self, filter: &DebtFilter) -> ResultEngine<Vec<Debt>> {
        let mut query = debts::Entity::find();
        if let Some(group_id) = filter.group_id {
            query = query.filter(debts::Column::GroupId.eq(group_id));
        }
        if let Some(user_id) = filter.user_id {
            query = query.filter(
                Condition::any()
                    .add(debts::Column::FromUserId.eq(user_id))
                    .add(debts::Column::ToUserId.eq(user_id)),
            );
        }
        if let Some(status) = filter.status {
            query = query.filter(debts::Column::Status.eq(status.as_str()));
        }

        query
            .order_by_desc(debts::Column::CreatedAt)
            .order_by_desc(debts::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Debt::try_from)
            .collect()
    }

    /// Partially update a debt. Moving to `settled` stamps `settled_at`;
    /// any other status clears it.
    pub async fn update_debt(&self, debt_id: i32, changes: DebtChanges) -> ResultEngine<Debt> {
        if let Some(amount_minor) = changes.amount_minor {
            validate_amount(amount_minor)?;
        }
        validate_description(changes.description.as_deref())?;

        with_tx!(self, |db_tx| {
            let existing = debts::Entity::find_by_id(debt_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("debt".to_string()))?;

            let now = Utc::now();
            let mut active: debts::ActiveModel = existing.into();
            if let Some(amount_minor) = changes.amount_minor {
                active.amount_minor = ActiveValue::Set(amount_minor);
            }
            if changes.description.is_some() {
                active.description =
                    ActiveValue::Set(normalize_optional_text(changes.description.as_deref()));
            }
            if let Some(status) = changes.status {
                active.status = ActiveValue::Set(status.as_str().to_string());
                active.settled_at = ActiveValue::Set(match status {
                    DebtStatus::Settled => Some(now),
                    DebtStatus::Active | DebtStatus::Cancelled => None,
                });
            }
            active.updated_at = ActiveValue::Set(now);

            Debt::try_from(active.update(&db_tx).await?)
        })
    }

    pub async fn delete_debt(&self, debt_id: i32) -> ResultEngine<()> {
        let result = debts::Entity::delete_by_id(debt_id)
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::NotFound("debt".to_string()));
        }
        Ok(())
    }
}
