// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `run` and `retry` subcommands.

use std::sync::Arc;

use tracing::info;

use replyflow_anthropic::AnthropicProvider;
use replyflow_config::ReplyflowConfig;
use replyflow_core::ReplyflowError;
use replyflow_core::traits::StorageAdapter;
use replyflow_core::types::{AutomationResult, BusinessId, RunContext};
use replyflow_pipeline::{LogNotifier, Orchestrator};
use replyflow_storage::SqliteStorage;

use crate::publisher::LogPublisher;

async fn build_orchestrator(
    config: &ReplyflowConfig,
) -> Result<(Orchestrator, Arc<SqliteStorage>), ReplyflowError> {
    let storage = Arc::new(SqliteStorage::new(config.storage.database_path.clone()));
    storage.initialize().await?;

    let provider = Arc::new(AnthropicProvider::new(config)?);
    let orchestrator = Orchestrator::new(
        storage.clone(),
        provider,
        Arc::new(LogPublisher),
        Arc::new(LogNotifier),
        config.automation.clone(),
        config.anthropic.max_tokens,
    );
    Ok((orchestrator, storage))
}

fn print_result(label: &str, result: &AutomationResult) {
    println!(
        "{label}: success={} processed={} generated={} approved={} posted={} notified={}",
        result.success,
        result.processed,
        result.generated,
        result.approved,
        result.posted,
        result.notified
    );
    for error in &result.errors {
        println!(
            "  error [{} {}] {}",
            error.step, error.severity, error.message
        );
    }
}

pub async fn run_command(
    config: &ReplyflowConfig,
    business_id: String,
    user_id: String,
    slot: Option<String>,
) -> Result<(), ReplyflowError> {
    let (orchestrator, storage) = build_orchestrator(config).await?;
    let ctx = RunContext {
        business_id: BusinessId(business_id),
        user_id,
        slot_id: slot,
    };

    // Ctrl-C stops new batches; in-flight reviews finish.
    let cancel = orchestrator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, finishing current batch");
            cancel.cancel();
        }
    });

    let result = orchestrator.run(&ctx).await;
    print_result("run", &result);
    storage.close().await?;

    if result.success {
        Ok(())
    } else {
        Err(ReplyflowError::Internal(
            "automation run failed, see errors above".to_string(),
        ))
    }
}

pub async fn retry_command(
    config: &ReplyflowConfig,
    business_id: String,
    user_id: String,
) -> Result<(), ReplyflowError> {
    let (orchestrator, storage) = build_orchestrator(config).await?;
    let ctx = RunContext {
        business_id: BusinessId(business_id),
        user_id,
        slot_id: None,
    };

    let result = orchestrator.retry_failed_automation(&ctx).await;
    print_result("retry", &result);
    storage.close().await?;
    Ok(())
}
