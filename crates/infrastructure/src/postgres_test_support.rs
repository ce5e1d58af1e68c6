//! Database fixtures for the PostgreSQL adapter tests.
//!
//! Tests only run when `DATABASE_URL` is set.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub(crate) async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres tests: {error}");
    }

    Some(pool)
}

pub(crate) async fn insert_user(pool: &PgPool, groups: &[&str]) -> Uuid {
    let user_id = Uuid::new_v4();
    let inserted = sqlx::query("INSERT INTO users (id, username) VALUES ($1, $2)")
        .bind(user_id)
        .bind(format!("user-{user_id}"))
        .execute(pool)
        .await;
    assert!(inserted.is_ok());

    for group in groups {
        let inserted = sqlx::query("INSERT INTO user_groups (user_id, group_name) VALUES ($1, $2)")
            .bind(user_id)
            .bind(*group)
            .execute(pool)
            .await;
        assert!(inserted.is_ok());
    }

    user_id
}

pub(crate) async fn insert_organizational_unit(pool: &PgPool, parent_id: Option<Uuid>) -> Uuid {
    let unit_id = Uuid::new_v4();
    let inserted = sqlx::query(
        "INSERT INTO organizational_units (id, parent_id, display_name) VALUES ($1, $2, $3)",
    )
    .bind(unit_id)
    .bind(parent_id)
    .bind(format!("ou-{unit_id}"))
    .execute(pool)
    .await;
    assert!(inserted.is_ok());

    unit_id
}

pub(crate) async fn assign_user(pool: &PgPool, unit_id: Uuid, user_id: Uuid) {
    let inserted = sqlx::query(
        "INSERT INTO organizational_units_users (organizational_unit_id, user_id) VALUES ($1, $2)",
    )
    .bind(unit_id)
    .bind(user_id)
    .execute(pool)
    .await;
    assert!(inserted.is_ok());
}

pub(crate) async fn assign_group(pool: &PgPool, unit_id: Uuid, group_name: &str) {
    let inserted = sqlx::query(
        "INSERT INTO organizational_units_groups (organizational_unit_id, group_name) VALUES ($1, $2)",
    )
    .bind(unit_id)
    .bind(group_name)
    .execute(pool)
    .await;
    assert!(inserted.is_ok());
}

pub(crate) async fn insert_cloud_account(pool: &PgPool, unit_id: Uuid, name: &str) -> Uuid {
    let account_id = Uuid::new_v4();
    let inserted = sqlx::query(
        r#"
        INSERT INTO cloud_accounts (id, cloud, tenant_id, account_id, name, organizational_unit_id)
        VALUES ($1, 'aws', 'o-root', $2, $3, $4)
        "#,
    )
    .bind(account_id)
    .bind(account_id.to_string())
    .bind(name)
    .bind(unit_id)
    .execute(pool)
    .await;
    assert!(inserted.is_ok());

    account_id
}
