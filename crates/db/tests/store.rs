//! Integration tests for `PgStore` against a real database.
//!
//! Exercises the uniqueness constraints, the non-negative quantity check and
//! the error classification that the core relies on. Run with
//! `DATABASE_URL` set and `--ignored`.

use assert_matches::assert_matches;
use figtally_core::account::NewUserAccount;
use figtally_core::definition::{DefinitionChanges, NewDefinition};
use figtally_core::error::StoreError;
use figtally_core::ports::{
    AccountRepository, DefinitionRepository, PossessionRepository, ReferenceRepository,
    StoreHealth,
};
use figtally_core::possession::{NewPossession, Quantities};
use figtally_core::roles::Role;
use figtally_db::models::reference::{CreateFaction, CreateOrder};
use figtally_db::repositories::{FactionRepo, FigurineTypeRepo, OrderRepo};
use figtally_db::PgStore;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Seed one order, one faction and one figurine type; returns (faction_id, type_id).
async fn seed_references(pool: &PgPool) -> (i64, i64) {
    let order = OrderRepo::create(
        pool,
        &CreateOrder {
            name: "Order".into(),
            description: None,
            logo_url: None,
            image_url: None,
            sort_order: None,
        },
    )
    .await
    .unwrap();
    let faction = FactionRepo::create(
        pool,
        &CreateFaction {
            name: "Stormcast Eternals".into(),
            order_id: order.id,
            description: None,
            logo_url: None,
            image_url: None,
            sort_order: None,
        },
    )
    .await
    .unwrap();
    let kind = FigurineTypeRepo::create(pool, "Infantry").await.unwrap();
    (faction.id, kind.id)
}

fn new_definition(name: &str, faction_id: i64, figurine_type_id: i64) -> NewDefinition {
    NewDefinition {
        name: name.to_string(),
        description: format!("Figurine {name}."),
        faction_id,
        figurine_type_id,
        image_url: "https://via.placeholder.com/150".into(),
    }
}

fn new_user(username: &str) -> NewUserAccount {
    NewUserAccount {
        username: username.to_string(),
        email: format!("{username}@test.com"),
        password_hash: "hash".into(),
        role: Role::User,
    }
}

// ---------------------------------------------------------------------------
// Uniqueness
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn duplicate_definition_name_is_a_conflict(pool: PgPool) {
    let (faction_id, type_id) = seed_references(&pool).await;
    let store = PgStore::new(pool);
    let input = new_definition("Liberators", faction_id, type_id);

    store.insert_definition(&input).await.unwrap();
    let err = store.insert_definition(&input).await.unwrap_err();

    assert_matches!(err, StoreError::Conflict { ref constraint } if constraint == "uq_figurine_definitions_name");
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn duplicate_possession_pair_is_a_conflict(pool: PgPool) {
    let (faction_id, type_id) = seed_references(&pool).await;
    let store = PgStore::new(pool);
    let def = store
        .insert_definition(&new_definition("Liberators", faction_id, type_id))
        .await
        .unwrap();
    let user = store.insert_user(&new_user("alice")).await.unwrap();
    let input = NewPossession {
        figurine_definition_id: def.id,
        user_id: user.id,
        quantities: Quantities::default(),
    };

    store.insert_possession(&input).await.unwrap();
    let err = store.insert_possession(&input).await.unwrap_err();

    assert_matches!(err, StoreError::Conflict { ref constraint } if constraint == "uq_figurines_definition_user");
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn duplicate_email_is_a_conflict(pool: PgPool) {
    let store = PgStore::new(pool);
    store.insert_user(&new_user("alice")).await.unwrap();

    let mut again = new_user("alice2");
    again.email = "alice@test.com".into();
    let err = store.insert_user(&again).await.unwrap_err();

    assert_matches!(err, StoreError::Conflict { ref constraint } if constraint == "uq_users_email");
}

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn definition_update_only_touches_supplied_columns(pool: PgPool) {
    let (faction_id, type_id) = seed_references(&pool).await;
    let store = PgStore::new(pool);
    let def = store
        .insert_definition(&new_definition("Liberators", faction_id, type_id))
        .await
        .unwrap();

    let updated = store
        .update_definition(
            def.id,
            &DefinitionChanges {
                description: Some("Hammers".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.description, "Hammers");
    assert_eq!(updated.name, "Liberators");
    assert_eq!(updated.faction_id, faction_id);
    assert!(store
        .update_definition(9999, &DefinitionChanges::default())
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn negative_quantity_violates_check_constraint(pool: PgPool) {
    let (faction_id, type_id) = seed_references(&pool).await;
    let store = PgStore::new(pool);
    let def = store
        .insert_definition(&new_definition("Liberators", faction_id, type_id))
        .await
        .unwrap();
    let user = store.insert_user(&new_user("alice")).await.unwrap();
    let possession = store
        .insert_possession(&NewPossession {
            figurine_definition_id: def.id,
            user_id: user.id,
            quantities: Quantities::default(),
        })
        .await
        .unwrap();

    let err = store
        .save_quantities(
            possession.id,
            &Quantities {
                painted: -1,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert_matches!(err, StoreError::Backend(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn role_change_round_trips(pool: PgPool) {
    let store = PgStore::new(pool);
    let user = store.insert_user(&new_user("alice")).await.unwrap();
    assert_eq!(user.role, Role::User);

    let promoted = store.set_role(user.id, Role::Admin).await.unwrap().unwrap();
    assert_eq!(promoted.role, Role::Admin);
}

// ---------------------------------------------------------------------------
// Listing and health
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn definitions_list_by_name_and_references_resolve(pool: PgPool) {
    let (faction_id, type_id) = seed_references(&pool).await;
    let store = PgStore::new(pool);
    store
        .insert_definition(&new_definition("Vindictors", faction_id, type_id))
        .await
        .unwrap();
    store
        .insert_definition(&new_definition("Annihilators", faction_id, type_id))
        .await
        .unwrap();
    store
        .insert_definition(&new_definition("aelf Wardens", faction_id, type_id))
        .await
        .unwrap();

    let names: Vec<_> = store
        .list_definitions()
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(names, vec!["Annihilators", "Vindictors", "aelf Wardens"]);

    let faction = store.find_faction(faction_id).await.unwrap().unwrap();
    assert_eq!(faction.sort_order, 999);
    assert!(store.find_order(faction.order_id).await.unwrap().is_some());
    assert!(store.ping().await.is_ok());
}
