//! Integration tests for target storage
//!
//! These run migrations against a temporary local libsql file and exercise
//! the store end to end.

use std::time::Duration;

use anyhow::Result;
use tempfile::{TempDir, tempdir};
use uuid::Uuid;

use super::migrations::get_current_version;
use super::{DatabaseImpl, TargetRecord, TargetStore, connect};
use crate::config::DatabaseConfig;

/// Helper to create a migrated store in a temp dir
async fn create_test_store() -> Result<(DatabaseImpl, TempDir)> {
    let temp_dir = tempdir()?;
    let config = DatabaseConfig {
        path: temp_dir.path().join("data/test.db"),
        ..DatabaseConfig::default()
    };

    let store = connect(&config).await?;
    Ok((store, temp_dir))
}

#[tokio::test]
async fn test_migrations_are_idempotent() -> Result<()> {
    let temp_dir = tempdir()?;
    let config = DatabaseConfig { path: temp_dir.path().join("test.db"), ..Default::default() };

    connect(&config).await?;
    connect(&config).await?;

    let db = libsql::Builder::new_local(&config.path).build().await?;
    let conn = db.connect()?;
    assert_eq!(get_current_version(&conn).await?, 1);
    Ok(())
}

#[tokio::test]
async fn test_save_and_fetch_target() -> Result<()> {
    let (store, _dir) = create_test_store().await?;

    let mut record = TargetRecord::new("https://example.com/health".into());
    record.name = "example".into();
    record.method = "HEAD".into();
    record.headers.insert("Authorization".into(), "Bearer abc".into());
    record.healthy_content = "ok".into();
    record.timeout_ms = 2500;

    let id = store.save_target(&record).await?;
    let fetched = store.get_target(record.uuid).await?.expect("target was saved");

    assert_eq!(fetched.id, Some(id));
    assert_eq!(fetched.name, "example");
    assert_eq!(fetched.method, "HEAD");
    assert_eq!(fetched.headers["Authorization"], "Bearer abc");
    assert_eq!(fetched.healthy_content, "ok");

    let target = fetched.to_target(Duration::from_secs(10));
    assert_eq!(target.timeout, Duration::from_millis(2500));
    assert!(target.validate().is_ok());
    Ok(())
}

#[tokio::test]
async fn test_fetch_all_skips_disabled_targets() -> Result<()> {
    let (store, _dir) = create_test_store().await?;

    let enabled = TargetRecord::new("https://up.example.com".into());
    let mut disabled = TargetRecord::new("https://off.example.com".into());
    disabled.enabled = false;

    store.save_target(&enabled).await?;
    store.save_target(&disabled).await?;

    let checked = store.fetch_all().await?;
    assert_eq!(checked.len(), 1);
    assert_eq!(checked[0].uuid, enabled.uuid);

    assert_eq!(store.list_targets().await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_update_existing_target() -> Result<()> {
    let (store, _dir) = create_test_store().await?;

    let mut record = TargetRecord::new("https://example.com".into());
    record.id = Some(store.save_target(&record).await?);
    record.healthy_max_status = 399;
    record.enabled = false;
    store.save_target(&record).await?;

    let fetched = store.get_target(record.uuid).await?.expect("target exists");
    assert_eq!(fetched.healthy_max_status, 399);
    assert!(!fetched.enabled);
    assert_eq!(store.list_targets().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_save_rejects_inverted_range() -> Result<()> {
    let (store, _dir) = create_test_store().await?;

    let mut record = TargetRecord::new("https://example.com".into());
    record.healthy_min_status = 500;
    record.healthy_max_status = 200;

    assert!(store.save_target(&record).await.is_err());
    assert!(store.list_targets().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_delete_target() -> Result<()> {
    let (store, _dir) = create_test_store().await?;

    let record = TargetRecord::new("https://example.com".into());
    store.save_target(&record).await?;

    assert!(store.delete_target(record.uuid).await?);
    assert!(!store.delete_target(record.uuid).await?);
    assert!(!store.delete_target(Uuid::new_v4()).await?);
    assert!(store.get_target(record.uuid).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_count_includes_disabled_targets() -> Result<()> {
    let (store, _dir) = create_test_store().await?;
    assert_eq!(store.count().await?, 0);

    let enabled = TargetRecord::new("https://up.example.com".into());
    let mut disabled = TargetRecord::new("https://off.example.com".into());
    disabled.enabled = false;
    store.save_target(&enabled).await?;
    store.save_target(&disabled).await?;

    assert_eq!(store.count().await?, 2);

    store.delete_target(enabled.uuid).await?;
    assert_eq!(store.count().await?, 1);
    Ok(())
}
