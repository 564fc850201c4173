use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, Group, ResultEngine, User, group_members, groups, users,
    validation::{normalize_optional_text, validate_description, validate_group_name},
};

use super::{Engine, with_tx};

async fn members_of(db: &DatabaseTransaction, group_id: i32) -> ResultEngine<Vec<User>> {
    let members = users::Entity::find()
        .inner_join(group_members::Entity)
        .filter(group_members::Column::GroupId.eq(group_id))
        .order_by_asc(group_members::Column::JoinedAt)
        .order_by_asc(group_members::Column::Id)
        .all(db)
        .await?;
    Ok(members.into_iter().map(User::from).collect())
}

impl Engine {
    /// Create a group owned by `created_by`. The creator becomes the first
    /// member.
    pub async fn new_group(
        &self,
        name: &str,
        description: Option<&str>,
        created_by: i32,
    ) -> ResultEngine<Group> {
        validate_group_name(name)?;
        validate_description(description)?;
        let description = normalize_optional_text(description);

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, created_by).await?;

            let now = Utc::now();
            let model = groups::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name.to_string()),
                description: ActiveValue::Set(description.clone()),
                created_by: ActiveValue::Set(created_by),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            group_members::ActiveModel {
                id: ActiveValue::NotSet,
                group_id: ActiveValue::Set(model.id),
                user_id: ActiveValue::Set(created_by),
                joined_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            let mut group = Group::from(model);
            group.members = members_of(&db_tx, group.id).await?;
            Ok(group)
        })
    }

    /// Return a group together with its members.
    pub async fn group(&self, group_id: i32) -> ResultEngine<Group> {
        with_tx!(self, |db_tx| {
            let model = self.require_group(&db_tx, group_id).await?;
            let mut group = Group::from(model);
            group.members = members_of(&db_tx, group_id).await?;
            Ok(group)
        })
    }

    /// All groups, newest first. Members are not loaded.
    pub async fn groups(&self) -> ResultEngine<Vec<Group>> {
        let models = groups::Entity::find()
            .order_by_desc(groups::Column::CreatedAt)
            .order_by_desc(groups::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Group::from).collect())
    }

    pub async fn update_group(
        &self,
        group_id: i32,
        name: Option<&str>,
        description: Option<&str>,
    ) -> ResultEngine<Group> {
        if let Some(name) = name {
            validate_group_name(name)?;
        }
        validate_description(description)?;

        with_tx!(self, |db_tx| {
            let existing = self.require_group(&db_tx, group_id).await?;

            let mut active: groups::ActiveModel = existing.into();
            if let Some(name) = name {
                active.name = ActiveValue::Set(name.to_string());
            }
            if description.is_some() {
                active.description = ActiveValue::Set(normalize_optional_text(description));
            }
            active.updated_at = ActiveValue::Set(Utc::now());

            let mut group = Group::from(active.update(&db_tx).await?);
            group.members = members_of(&db_tx, group_id).await?;
            Ok(group)
        })
    }

    /// Hard delete. Memberships and debts cascade.
    pub async fn delete_group(&self, group_id: i32) -> ResultEngine<()> {
        let result = groups::Entity::delete_by_id(group_id)
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::NotFound("group".to_string()));
        }
        Ok(())
    }

    pub async fn add_group_member(&self, group_id: i32, user_id: i32) -> ResultEngine<Vec<User>> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            self.require_user(&db_tx, user_id).await?;

            if self.is_group_member(&db_tx, group_id, user_id).await? {
                return Err(EngineError::Conflict(
                    "user is already a member of this group".to_string(),
                ));
            }

            group_members::ActiveModel {
                id: ActiveValue::NotSet,
                group_id: ActiveValue::Set(group_id),
                user_id: ActiveValue::Set(user_id),
                joined_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await
            .map_err(|err| {
                EngineError::conflict_on_unique(err, "user is already a member of this group")
            })?;

            members_of(&db_tx, group_id).await
        })
    }

    /// Remove a member. The group creator cannot be removed.
    pub async fn remove_group_member(&self, group_id: i32, user_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let group = self.require_group(&db_tx, group_id).await?;
            if group.created_by == user_id {
                return Err(EngineError::Validation(
                    "cannot remove group owner".to_string(),
                ));
            }

            let result = group_members::Entity::delete_many()
                .filter(group_members::Column::GroupId.eq(group_id))
                .filter(group_members::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::NotFound("group member".to_string()));
            }
            Ok(())
        })
    }

    pub async fn group_members(&self, group_id: i32) -> ResultEngine<Vec<User>> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            members_of(&db_tx, group_id).await
        })
    }

    pub(super) async fn is_group_member(
        &self,
        db: &DatabaseTransaction,
        group_id: i32,
        user_id: i32,
    ) -> ResultEngine<bool> {
        Ok(group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id))
            .filter(group_members::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .is_some())
    }
}
