use sea_orm::{Condition, PaginatorTrait, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    DebtStatus, DebtSummary, EngineError, GroupSummary, ResultEngine, debts, group_members,
};

use super::{Engine, with_tx};

impl Engine {
    /// What a user owes and is owed across active debts, optionally limited
    /// to one group.
    pub async fn debt_summary(&self, user_id: i32, group_id: Option<i32>) -> ResultEngine<DebtSummary> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            if let Some(group_id) = group_id {
                self.require_group(&db_tx, group_id).await?;
            }

            let mut query = debts::Entity::find()
                .filter(debts::Column::Status.eq(DebtStatus::Active.as_str()))
                .filter(
                    Condition::any()
                        .add(debts::Column::FromUserId.eq(user_id))
                        .add(debts::Column::ToUserId.eq(user_id)),
                );
            if let Some(group_id) = group_id {
                query = query.filter(debts::Column::GroupId.eq(group_id));
            }

            let (mut owed, mut owed_to) = (0_i64, 0_i64);
            for debt in query.all(&db_tx).await? {
                if debt.from_user_id == user_id {
                    owed = add_amount(owed, debt.amount_minor)?;
                } else {
                    owed_to = add_amount(owed_to, debt.amount_minor)?;
                }
            }
            let net = owed_to.checked_sub(owed).ok_or_else(overflow)?;

            Ok(DebtSummary {
                user_id,
                user_name: user.name,
                total_owed_minor: owed,
                total_owed_to_minor: owed_to,
                net_balance_minor: net,
            })
        })
    }

    /// Debt totals and member count of a group.
    pub async fn group_summary(&self, group_id: i32) -> ResultEngine<GroupSummary> {
        with_tx!(self, |db_tx| {
            let group = self.require_group(&db_tx, group_id).await?;

            let rows = debts::Entity::find()
                .filter(debts::Column::GroupId.eq(group_id))
                .all(&db_tx)
                .await?;

            let mut summary = GroupSummary {
                group_id,
                group_name: group.name,
                total_debts_minor: 0,
                active_debts: 0,
                settled_debts: 0,
                member_count: 0,
            };
            for debt in rows {
                match DebtStatus::try_from(debt.status.as_str())? {
                    DebtStatus::Active => {
                        summary.active_debts += 1;
                        summary.total_debts_minor =
                            add_amount(summary.total_debts_minor, debt.amount_minor)?;
                    }
                    DebtStatus::Settled => summary.settled_debts += 1,
                    DebtStatus::Cancelled => {}
                }
            }

            summary.member_count = group_members::Entity::find()
                .filter(group_members::Column::GroupId.eq(group_id))
                .count(&db_tx)
                .await?;

            Ok(summary)
        })
    }
}

fn add_amount(total: i64, amount: i64) -> ResultEngine<i64> {
    total.checked_add(amount).ok_or_else(overflow)
}

fn overflow() -> EngineError {
    EngineError::Validation("debt total exceeds the supported amount range".to_string())
}
