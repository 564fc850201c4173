use sea_orm::{Database, DatabaseConnection};

use engine::{Engine, EngineError, NewDebt, User};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn users(engine: &Engine, names: &[&str]) -> Vec<User> {
    let mut out = Vec::new();
    for name in names {
        let email = format!("{}@example.com", name.to_lowercase());
        out.push(engine.new_user(name, &email).await.unwrap());
    }
    out
}

fn member_ids(members: &[User]) -> Vec<i32> {
    members.iter().map(|u| u.id).collect()
}

#[tokio::test]
async fn creator_is_first_member() {
    let (engine, _db) = engine_with_db().await;
    let alice = &users(&engine, &["Alice"]).await[0];

    let group = engine
        .new_group("Flatmates", Some("  rent and bills  "), alice.id)
        .await
        .unwrap();

    assert_eq!(group.name, "Flatmates");
    assert_eq!(group.description.as_deref(), Some("rent and bills"));
    assert_eq!(group.created_by, alice.id);
    assert_eq!(member_ids(&group.members), vec![alice.id]);

    let fetched = engine.group(group.id).await.unwrap();
    assert_eq!(fetched, group);
}

#[tokio::test]
async fn blank_description_is_stored_as_none() {
    let (engine, _db) = engine_with_db().await;
    let alice = &users(&engine, &["Alice"]).await[0];

    let group = engine.new_group("Trip", Some("   "), alice.id).await.unwrap();
    assert_eq!(group.description, None);
}

#[tokio::test]
async fn create_group_validation() {
    let (engine, _db) = engine_with_db().await;
    let alice = &users(&engine, &["Alice"]).await[0];

    let err = engine.new_group("", None, alice.id).await.unwrap_err();
    assert_eq!(err, EngineError::Validation("name is required".to_string()));

    let err = engine.new_group("X", None, alice.id).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("name must be at least 2 characters long".to_string())
    );

    let long = "d".repeat(501);
    let err = engine
        .new_group("Trip", Some(&long), alice.id)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("description must be no more than 500 characters long".to_string())
    );

    let err = engine.new_group("Trip", None, 404).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("user".to_string()));

    assert!(engine.groups().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_groups_newest_first() {
    let (engine, _db) = engine_with_db().await;
    let alice = &users(&engine, &["Alice"]).await[0];

    let first = engine.new_group("First", None, alice.id).await.unwrap();
    let second = engine.new_group("Second", None, alice.id).await.unwrap();

    let listed = engine.groups().await.unwrap();
    let ids: Vec<i32> = listed.iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert!(listed.iter().all(|g| g.members.is_empty()));
}

#[tokio::test]
async fn update_group_is_partial() {
    let (engine, _db) = engine_with_db().await;
    let alice = &users(&engine, &["Alice"]).await[0];
    let group = engine
        .new_group("Trip", Some("summer"), alice.id)
        .await
        .unwrap();

    let renamed = engine
        .update_group(group.id, Some("Road trip"), None)
        .await
        .unwrap();
    assert_eq!(renamed.name, "Road trip");
    assert_eq!(renamed.description.as_deref(), Some("summer"));
    assert_eq!(member_ids(&renamed.members), vec![alice.id]);

    let described = engine
        .update_group(group.id, None, Some("autumn"))
        .await
        .unwrap();
    assert_eq!(described.name, "Road trip");
    assert_eq!(described.description.as_deref(), Some("autumn"));

    let err = engine
        .update_group(group.id, Some("R"), None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("name must be at least 2 characters long".to_string())
    );

    let err = engine
        .update_group(999, Some("Ghost"), None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("group".to_string()));
}

#[tokio::test]
async fn membership_lifecycle() {
    let (engine, _db) = engine_with_db().await;
    let people = users(&engine, &["Alice", "Bob", "Carol"]).await;
    let (alice, bob, carol) = (&people[0], &people[1], &people[2]);
    let group = engine.new_group("Trip", None, alice.id).await.unwrap();

    let members = engine.add_group_member(group.id, bob.id).await.unwrap();
    assert_eq!(member_ids(&members), vec![alice.id, bob.id]);

    let members = engine.add_group_member(group.id, carol.id).await.unwrap();
    assert_eq!(member_ids(&members), vec![alice.id, bob.id, carol.id]);

    engine.remove_group_member(group.id, bob.id).await.unwrap();
    let members = engine.group_members(group.id).await.unwrap();
    assert_eq!(member_ids(&members), vec![alice.id, carol.id]);
}

#[tokio::test]
async fn membership_errors() {
    let (engine, _db) = engine_with_db().await;
    let people = users(&engine, &["Alice", "Bob"]).await;
    let (alice, bob) = (&people[0], &people[1]);
    let group = engine.new_group("Trip", None, alice.id).await.unwrap();

    let err = engine.add_group_member(group.id, alice.id).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::Conflict("user is already a member of this group".to_string())
    );

    let err = engine.add_group_member(group.id, 999).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("user".to_string()));

    let err = engine.add_group_member(999, bob.id).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("group".to_string()));

    let err = engine
        .remove_group_member(group.id, alice.id)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("cannot remove group owner".to_string())
    );

    let err = engine
        .remove_group_member(group.id, bob.id)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("group member".to_string()));

    let err = engine.group_members(999).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("group".to_string()));
}

#[tokio::test]
async fn delete_group_removes_debts() {
    let (engine, _db) = engine_with_db().await;
    let people = users(&engine, &["Alice", "Bob"]).await;
    let (alice, bob) = (&people[0], &people[1]);
    let group = engine.new_group("Trip", None, alice.id).await.unwrap();
    engine.add_group_member(group.id, bob.id).await.unwrap();
    let debt = engine
        .new_debt(NewDebt {
            group_id: group.id,
            from_user_id: bob.id,
            to_user_id: alice.id,
            amount_minor: 2_000,
            description: Some("tickets".to_string()),
        })
        .await
        .unwrap();

    engine.delete_group(group.id).await.unwrap();

    assert_eq!(
        engine.group(group.id).await.unwrap_err(),
        EngineError::NotFound("group".to_string())
    );
    assert_eq!(
        engine.debt(debt.id).await.unwrap_err(),
        EngineError::NotFound("debt".to_string())
    );
    assert_eq!(
        engine.delete_group(group.id).await.unwrap_err(),
        EngineError::NotFound("group".to_string())
    );
    // Users survive their groups.
    assert_eq!(engine.user(bob.id).await.unwrap().id, bob.id);
}

#[tokio::test]
async fn group_summary_counts() {
    let (engine, _db) = engine_with_db().await;
    let people = users(&engine, &["Alice", "Bob", "Carol"]).await;
    let (alice, bob, carol) = (&people[0], &people[1], &people[2]);
    let group = engine.new_group("Trip", None, alice.id).await.unwrap();
    engine.add_group_member(group.id, bob.id).await.unwrap();
    engine.add_group_member(group.id, carol.id).await.unwrap();

    let empty = engine.group_summary(group.id).await.unwrap();
    assert_eq!(empty.group_name, "Trip");
    assert_eq!(empty.total_debts_minor, 0);
    assert_eq!(empty.active_debts, 0);
    assert_eq!(empty.settled_debts, 0);
    assert_eq!(empty.member_count, 3);

    let mut ids = Vec::new();
    for (from, amount) in [(bob.id, 1_000), (carol.id, 500), (carol.id, 250)] {
        let debt = engine
            .new_debt(NewDebt {
                group_id: group.id,
                from_user_id: from,
                to_user_id: alice.id,
                amount_minor: amount,
                description: None,
            })
            .await
            .unwrap();
        ids.push(debt.id);
    }
    engine
        .update_debt(
            ids[1],
            engine::DebtChanges {
                status: Some(engine::DebtStatus::Settled),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    engine
        .update_debt(
            ids[2],
            engine::DebtChanges {
                status: Some(engine::DebtStatus::Cancelled),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let summary = engine.group_summary(group.id).await.unwrap();
    assert_eq!(summary.group_id, group.id);
    assert_eq!(summary.total_debts_minor, 1_000);
    assert_eq!(summary.active_debts, 1);
    assert_eq!(summary.settled_debts, 1);
    assert_eq!(summary.member_count, 3);

    let err = engine.group_summary(999).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("group".to_string()));
}
