use std::io;
use std::sync::Arc;

use tracing::info;
use uptime::{Coordinator, HttpProber, Resolver, ResolverConfig, RunSummary, Target};
use uuid::Uuid;

use crate::cli::AddArgs;
use crate::config::Config;
use crate::database::{TargetRecord, TargetStore};
use crate::error::AppError;
use crate::report;

/// Check every enabled target once
pub async fn run(config: &Config, store: &dyn TargetStore, json: bool) -> Result<RunSummary, AppError> {
    let targets: Vec<Target> = store
        .fetch_all()
        .await?
        .iter()
        .map(|record| record.to_target(config.probe.default_timeout()))
        .collect();
    let stored = store.count().await?;
    info!(stored, enabled = targets.len(), "Loaded targets");

    let prober = HttpProber::with_user_agent(&config.probe.user_agent)?
        .with_body_limit(config.probe.max_body_bytes);
    let resolver = Resolver::with_config(
        Arc::new(prober),
        ResolverConfig { probe_spacing: config.probe.probe_spacing() },
    );

    let summary = Coordinator::new(resolver).run_all(targets).await;

    if json {
        report::print_summary_json(&summary)?;
    }

    Ok(summary)
}

pub async fn list(store: &dyn TargetStore, json: bool) -> Result<(), AppError> {
    let targets = store.list_targets().await?;

    if json {
        report::write_json(io::stdout().lock(), &targets)?;
    } else {
        report::write_targets(io::stdout().lock(), &targets)?;
    }

    Ok(())
}

pub fn record_from_args(args: AddArgs) -> TargetRecord {
    let mut record = TargetRecord::new(args.url);
    if let Some(name) = args.name {
        record.name = name;
    }
    record.method = args.method.to_uppercase();
    record.headers = args.headers.into_iter().collect();
    record.healthy_min_status = args.min_status;
    record.healthy_max_status = args.max_status;
    record.healthy_content = args.content.unwrap_or_default();
    record.timeout_ms = args.timeout_ms.unwrap_or(0);
    record.enabled = !args.disabled;
    record
}

/// Validate and store a new target, returning its uuid
pub async fn add(config: &Config, store: &dyn TargetStore, args: AddArgs) -> Result<Uuid, AppError> {
    let record = record_from_args(args);
    record.to_target(config.probe.default_timeout()).validate()?;

    store.save_target(&record).await?;
    info!(uuid = %record.uuid, url = %record.url, "Added target");
    println!("{}", record.uuid);

    Ok(record.uuid)
}

pub async fn remove(store: &dyn TargetStore, uuid: Uuid) -> Result<(), AppError> {
    let Some(target) = store.get_target(uuid).await? else {
        return Err(AppError::TargetNotFound(uuid));
    };

    store.delete_target(uuid).await?;
    info!(%uuid, url = %target.url, "Removed target");
    Ok(())
}
