/// Integration tests for database migrations
///
/// Run with: cargo test -p taskquest-shared --test db_migrations_tests -- --ignored

mod common;

use taskquest_shared::db::migrations::{get_migration_status, run_migrations};
use taskquest_shared::db::pool::{close_pool, health_check};

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_migrations_bring_schema_up_to_date() {
    let pool = common::setup_pool().await;

    let status = get_migration_status(&pool).await.expect("Failed to get status");
    assert!(status.applied_migrations > 0);
    assert!(status.is_up_to_date);
    assert!(status.latest_version.is_some());

    close_pool(pool).await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_migrations_are_idempotent() {
    let pool = common::setup_pool().await;

    let before = get_migration_status(&pool).await.unwrap();
    run_migrations(&pool).await.expect("Second run failed");
    let after = get_migration_status(&pool).await.unwrap();

    assert_eq!(before.applied_migrations, after.applied_migrations);
    assert_eq!(before.latest_version, after.latest_version);

    close_pool(pool).await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_all_tables_exist() {
    let pool = common::setup_pool().await;
    health_check(&pool).await.expect("Health check failed");

    for table in [
        "auth",
        "users",
        "tasks",
        "daily_to_do_lists",
        "points_tables",
        "progress_trackers",
    ] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_name = $1)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();

        assert!(exists, "table {} is missing", table);
    }

    close_pool(pool).await;
}
