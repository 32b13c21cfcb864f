//! Fraud Monitor - Main Entry Point
//!
//! Consumes chat messages from NATS, persists them, runs fraud and
//! brand-mention analysis, and publishes warning messages for flagged
//! content. Supports parallel message processing for high throughput.

use anyhow::{Context, Result};
use fraud_monitor::{
    config::AppConfig,
    consumer::MessageConsumer,
    detector::FraudDetector,
    ingest::MessageIngestor,
    metrics::{MetricsReporter, PipelineMetrics},
    notifier::{NatsNotifier, Notifier},
    storage::{MessageStore, PgMessageStore},
    types::IncomingMessage,
};
use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    init_logging(&config);

    info!("Starting Fraud Monitor Pipeline");
    info!(
        keywords = config.detection.brand_keywords.len(),
        workers = config.pipeline.workers,
        "Configuration loaded successfully"
    );

    // Initialize metrics
    let metrics = Arc::new(PipelineMetrics::new());

    // Initialize storage
    let store = Arc::new(
        PgMessageStore::connect(&config.database)
            .await
            .context("Failed to initialize storage")?,
    );

    match store.recent_alerts(24).await {
        Ok(alerts) => info!(recent_alerts = alerts.len(), "Storage ready"),
        Err(e) => warn!(error = %e, "Could not query recent alerts"),
    }

    // Initialize the analysis engine
    let detector = Arc::new(FraudDetector::new(
        &config.detection.brand_keywords,
        store.clone(),
    )?);

    // Connect to NATS
    let client = async_nats::connect(&config.nats.url)
        .await
        .context("Failed to connect to NATS")?;
    info!("Connected to NATS at {}", config.nats.url);

    // Initialize consumer and notifier
    let consumer = MessageConsumer::new(client.clone(), &config.nats.message_subject);
    let notifier = Arc::new(NatsNotifier::new(
        client.clone(),
        &config.nats.warning_subject,
    ));

    // OCR engines are external collaborators; without one, image attachments
    // are persisted but contribute no text.
    let ingestor = Arc::new(MessageIngestor::new(
        store.clone(),
        detector,
        None,
        config.ocr.min_confidence,
    ));
    info!("No OCR engine configured, image attachments are stored without text extraction");

    // Parallel processing configuration
    let num_workers = config.pipeline.workers;
    info!(
        "Starting message processing loop with {} parallel workers",
        num_workers
    );
    info!("Listening on subject: {}", config.nats.message_subject);
    info!("Publishing warnings to: {}", config.nats.warning_subject);

    // Semaphore to limit concurrent processing
    let semaphore = Arc::new(Semaphore::new(num_workers));
    let processed_count = Arc::new(AtomicU64::new(0));

    // Start metrics reporter (prints summary every 30 seconds)
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, 30);
        reporter.start().await;
    });

    // Process messages in parallel
    let mut subscription = consumer.subscribe().await?;

    while let Some(message) = subscription.next().await {
        // Acquire permit (limits concurrent tasks)
        let permit = semaphore.clone().acquire_owned().await.unwrap();

        // Clone shared resources for the spawned task
        let ingestor = ingestor.clone();
        let notifier = notifier.clone();
        let metrics = metrics.clone();
        let processed_count = processed_count.clone();

        // Spawn task to process this message
        tokio::spawn(async move {
            let start_time = Instant::now();

            match serde_json::from_slice::<IncomingMessage>(&message.payload) {
                Ok(incoming) => {
                    let attachments = incoming.attachments.len() as u64;

                    match ingestor
                        .process(&incoming, Some(notifier.as_ref() as &dyn Notifier))
                        .await
                    {
                        Ok(report) => {
                            let processing_time = start_time.elapsed();

                            metrics.record_message(
                                processing_time,
                                report.outcome.analysis.suspicion_score,
                            );
                            if attachments > 0 {
                                metrics.record_images(attachments);
                            }

                            for alert in &report.outcome.alerts {
                                metrics.record_alert(alert.alert_type.as_str());
                                info!(
                                    message_id = report.message_id,
                                    alert_id = alert.id,
                                    alert_type = %alert.alert_type,
                                    score = alert.score,
                                    processing_time_us = processing_time.as_micros(),
                                    "Alert generated"
                                );
                            }

                            let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;

                            // Log progress every 100 messages
                            if count % 100 == 0 {
                                let throughput = metrics.get_throughput();
                                let processing_stats = metrics.get_processing_stats();
                                info!(
                                    processed = count,
                                    throughput = format!("{:.1} msg/s", throughput),
                                    avg_latency_us = processing_stats.mean_us,
                                    "Processing milestone"
                                );
                            }
                        }
                        Err(e) => {
                            error!(
                                origin_message_id = incoming.message_id,
                                source_id = incoming.source_id,
                                error = %e,
                                "Failed to ingest message"
                            );
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to deserialize incoming message");
                }
            }

            // Release permit when done
            drop(permit);
        });
    }

    // Print final summary
    info!("Pipeline shutting down...");
    metrics.print_summary();

    Ok(())
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fraud_monitor={}", config.logging.level)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
