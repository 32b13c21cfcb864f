//! Test Chat Message Producer
//!
//! Generates and publishes synthetic chat messages to NATS for pipeline
//! testing, mixing benign chatter with fraud-flavored content.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Message structure matching the pipeline's expected format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    message_id: i64,
    source_id: i64,
    user_id: Option<i64>,
    username: Option<String>,
    text: Option<String>,
    timestamp: chrono::DateTime<Utc>,
}

const BENIGN_TEXTS: &[&str] = &[
    "anyone up for lunch later?",
    "the meeting moved to 3pm",
    "I love using PayPal for payments",
    "just booked flights with my mastercard",
    "did you see the game last night?",
    "thanks, invoice received",
    "new phone arrived today, very happy with it",
    "can someone share the doc again?",
];

const FRAUD_TEXTS: &[&str] = &[
    "URGENT: your visa card is suspended, verify account now",
    "selling fresh CC 4111-1111-1111-1111 cvv: 123 exp: 12/26",
    "stolen fullz with account number: 48291047 available",
    "update payment immediately or your paypal account will expire",
    "leaked mastercard dump, swift 309441, click here",
    "verify account for stripe or it gets suspended, urgent",
];

/// Message generator for testing
struct MessageGenerator {
    rng: rand::rngs::ThreadRng,
    message_counter: i64,
}

impl MessageGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            message_counter: 0,
        }
    }

    fn generate(&mut self, group_id: i64, fraudulent: bool) -> ChatMessage {
        self.message_counter += 1;
        let pool = if fraudulent { FRAUD_TEXTS } else { BENIGN_TEXTS };
        let text = pool[self.rng.gen_range(0..pool.len())];
        let user_id = self.rng.gen_range(1000..9999);

        ChatMessage {
            message_id: self.message_counter,
            source_id: group_id,
            user_id: Some(user_id),
            username: Some(format!("user_{user_id}")),
            text: Some(text.to_string()),
            timestamp: Utc::now(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chat_producer=info".parse()?),
        )
        .init();

    info!("Starting Test Chat Message Producer");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let nats_url = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("nats://localhost:4222");
    let subject = args.get(2).map(|s| s.as_str()).unwrap_or("chat.messages");
    let count: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(100);
    let fraud_rate: f64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0.1);
    let delay_ms: u64 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(100);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count = count,
        fraud_rate = fraud_rate,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    // Connect to NATS
    let client = match async_nats::connect(nats_url).await {
        Ok(c) => {
            info!("Connected to NATS");
            c
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS. Running in dry-run mode.");
            return run_dry_mode(count, fraud_rate, delay_ms).await;
        }
    };

    // Generate and publish messages
    let mut generator = MessageGenerator::new();
    let mut rng = rand::thread_rng();
    let group_id = -1_001_000;

    info!("Starting to publish {} messages...", count);

    let mut benign_count = 0;
    let mut fraudulent_count = 0;

    for i in 0..count {
        let fraudulent = rng.gen_bool(fraud_rate);
        if fraudulent {
            fraudulent_count += 1;
        } else {
            benign_count += 1;
        }
        let message = generator.generate(group_id, fraudulent);

        let payload = serde_json::to_vec(&message)?;

        client.publish(subject.to_string(), payload.into()).await?;

        if (i + 1) % 10 == 0 {
            info!(
                "Published {}/{} messages ({} benign, {} fraudulent)",
                i + 1,
                count,
                benign_count,
                fraudulent_count
            );
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    info!(
        "Completed! Published {} messages ({} benign, {} fraudulent)",
        count, benign_count, fraudulent_count
    );

    Ok(())
}

async fn run_dry_mode(count: u64, fraud_rate: f64, delay_ms: u64) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no NATS connection)");

    let mut generator = MessageGenerator::new();
    let mut rng = rand::thread_rng();

    for i in 0..count {
        let message = generator.generate(-1_001_000, rng.gen_bool(fraud_rate));

        let json = serde_json::to_string_pretty(&message)?;

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample message {}:\n{}", i + 1, json);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
