use anyhow::Context;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use filedrop_core::Config;
use filedrop_infra::LogFormat;
use filedrop_processing::{ThumbnailRenderer, ThumbnailSettings};
use filedrop_storage::ThumbnailKeys;
use filedrop_worker::{MediaConverter, MetadataUpdater, NotificationHandler, SqsDispatcher};
use std::sync::Arc;
use std::time::Duration;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    filedrop_infra::init_telemetry("filedrop-worker", LogFormat::parse(&config.base.log_format))?;

    let queues = &config.queues;
    if queues.metadata_queue_url.is_none() && queues.converter_queue_url.is_none() {
        anyhow::bail!("Set METADATA_QUEUE_URL and/or CONVERTER_QUEUE_URL");
    }

    // Attempts must outlive the long-poll wait
    let timeouts = TimeoutConfig::builder()
        .connect_timeout(Duration::from_secs(5))
        .operation_attempt_timeout(Duration::from_secs(60))
        .build();
    let mut aws = aws_config::defaults(BehaviorVersion::latest()).timeout_config(timeouts);
    if let Some(region) = &config.storage.region {
        aws = aws.region(Region::new(region.clone()));
    }
    let sqs = aws_sdk_sqs::Client::new(&aws.load().await);

    let shutdown = filedrop_infra::shutdown_token();
    let mut consumers = tokio::task::JoinSet::new();

    if let Some(queue_url) = &queues.metadata_queue_url {
        let metadata = filedrop_db::create_metadata_store(&config).await?;
        let updater: Arc<dyn NotificationHandler> = Arc::new(MetadataUpdater::new(metadata));
        let dispatcher = SqsDispatcher::new(sqs.clone(), queue_url, queues, updater);
        consumers.spawn(dispatcher.run(shutdown.clone()));
    }

    if let Some(queue_url) = &queues.converter_queue_url {
        let storage = filedrop_storage::create_storage(&config)
            .await
            .context("Failed to initialize object storage")?;
        tokio::fs::create_dir_all(&config.conversion.scratch_dir)
            .await
            .context("Failed to create scratch directory")?;
        let renderer = ThumbnailRenderer::new(ThumbnailSettings::from(&config.conversion))?;
        let converter: Arc<dyn NotificationHandler> = Arc::new(MediaConverter::new(
            storage,
            renderer,
            ThumbnailKeys::new(config.thumbnail_prefix()),
            config.conversion.timeout,
        ));
        let dispatcher = SqsDispatcher::new(sqs.clone(), queue_url, queues, converter);
        consumers.spawn(dispatcher.run(shutdown.clone()));
    }

    tracing::info!(consumers = consumers.len(), "Worker started");

    while let Some(result) = consumers.join_next().await {
        if let Err(e) = result {
            tracing::error!(error = %e, "Notification consumer panicked");
            shutdown.cancel();
        }
    }

    tracing::info!("Worker stopped");
    Ok(())
}
