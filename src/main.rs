use signalforge::config::EngineConfig;
use signalforge::services::pipeline::{Input, Output, Pipeline};
use signalforge::services::signals::SeriesKey;
use signalforge::services::social::Influencer;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Per-series queue depth before the reader waits on a slow worker.
const SERIES_QUEUE_DEPTH: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signalforge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = EngineConfig::from_env();
    config.validate()?;

    let influencers = match env::var("INFLUENCERS_CONFIG") {
        Ok(json) => Influencer::from_config_json(&json, &config.social)?,
        Err(_) => Vec::new(),
    };
    let retention_ms = env::var("OPPORTUNITY_RETENTION_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(config.scoring.evaluation_window_ms * 3);

    info!(
        "Starting signalforge ({} influencers, detection threshold {})",
        influencers.len(),
        config.scoring.detection_threshold
    );

    let pipeline = Arc::new(Pipeline::new(config, influencers, retention_ms)?);

    // Single writer keeps output lines whole.
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Output>();
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(output) = out_rx.recv().await {
            match serde_json::to_string(&output) {
                Ok(line) => {
                    if stdout.write_all(format!("{}\n", line).as_bytes()).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!("Failed to serialize output: {}", e),
            }
        }
        stdout.flush().await.ok();
    });

    // One worker per series, so bars of a series are applied in arrival order
    // while different series run in parallel.
    let mut workers: HashMap<SeriesKey, mpsc::Sender<Input>> = HashMap::new();
    let mut handles = Vec::new();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_no = 0usize;
    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let input: Input = match serde_json::from_str(line) {
            Ok(input) => input,
            Err(e) => {
                warn!("Skipping line {}: {}", line_no, e);
                continue;
            }
        };

        let key = match &input {
            Input::Bar { bar, .. } => Some(SeriesKey::of(bar)),
            Input::Posts { .. } => None,
        };
        let Some(key) = key else {
            if let Err(e) = pipeline.handle(input) {
                warn!("Skipping line {}: {}", line_no, e);
            }
            continue;
        };

        let sender = workers.entry(key.clone()).or_insert_with(|| {
            debug!("Spawning worker for {}", key);
            let (tx, rx) = mpsc::channel(SERIES_QUEUE_DEPTH);
            handles.push(tokio::spawn(run_worker(
                pipeline.clone(),
                rx,
                out_tx.clone(),
            )));
            tx
        });
        if sender.send(input).await.is_err() {
            warn!("Worker for {} stopped, dropping line {}", key, line_no);
        }
    }

    drop(workers);
    for handle in handles {
        handle.await.ok();
    }
    drop(out_tx);
    writer.await.ok();

    info!(
        "Input closed after {} lines, {} series tracked, {} active opportunities, evidence buffered for {} assets",
        line_no,
        pipeline.engine().series_count(),
        pipeline.tracker().len(),
        pipeline.buffered_assets()
    );
    Ok(())
}

async fn run_worker(
    pipeline: Arc<Pipeline>,
    mut rx: mpsc::Receiver<Input>,
    out: mpsc::UnboundedSender<Output>,
) {
    while let Some(input) = rx.recv().await {
        // Errors are already logged by the engine.
        let Ok(outputs) = pipeline.handle(input) else {
            continue;
        };
        for output in outputs {
            if out.send(output).is_err() {
                return;
            }
        }
    }
}
