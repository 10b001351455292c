use std::io::Write as _;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snapcode_core::client::{ApiEndpoints, HttpAnnouncementClient, HttpRedeemClient};
use snapcode_core::{
    load_config, schedule, validate_config, AccountPool, AccountRedeemer, CallbackSolver,
    CancelToken, ChallengeSolver, Config, Pipeline, PipelineResult, ProgressSink, SolverMode,
    TracingSink,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("snapcode {}", VERSION);

    // Determine config path
    let config_path = std::env::var("SNAPCODE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Keyword: {}", config.pipeline.keyword);
    info!("Accounts: {}", config.credentials.account_cookies.len());
    info!("Discovery workers: {}", config.pipeline.worker_count);

    // Cancellation wired to Ctrl+C / SIGTERM
    let cancel = CancelToken::new();
    spawn_signal_handler(cancel.clone());

    // Optional scheduled start
    if let Some(sched) = &config.schedule {
        let remaining = sched.start_at - chrono::Utc::now();
        info!(
            "Scheduled start at {} ({}s from now)",
            sched.start_at,
            remaining.num_seconds().max(0)
        );
        let reached =
            schedule::wait_until(sched.start_at, config.pipeline.poll_interval(), &cancel).await;
        if !reached {
            warn!("Cancelled before the scheduled start");
            return Ok(());
        }
    }

    let pipeline = build_pipeline(&config).context("Failed to build pipeline")?;

    let progress: Arc<dyn ProgressSink> = Arc::new(TracingSink);
    let result = pipeline
        .run(progress, &cancel)
        .await
        .context("Pipeline failed to start")?;

    report(&result)?;

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

/// Request cancellation on Ctrl+C or SIGTERM. The pipeline then winds down
/// cooperatively and still produces its per-account report.
fn spawn_signal_handler(cancel: CancelToken) {
    tokio::spawn(async move {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }

        warn!("Shutdown signal received, cancelling run");
        cancel.request();
    });
}

/// Wire the reqwest clients and the account pool from configuration.
fn build_pipeline(config: &Config) -> Result<Pipeline> {
    let endpoints = ApiEndpoints::default();
    let timeout = config.http.timeout();
    let proxy_url = config.http.proxy.as_ref().map(|p| p.url());
    if let Some(url) = &proxy_url {
        info!("Using proxy {}", url);
    }

    let announcements = Arc::new(
        HttpAnnouncementClient::new(
            config.credentials.authorization.clone(),
            timeout,
            endpoints.clone(),
        )
        .context("Failed to create announcement client")?,
    );

    let solver = create_solver(config)?;

    let accounts = config.credentials.accounts();
    let mut redeemers = Vec::with_capacity(accounts.len());
    for account in &accounts {
        let client = HttpRedeemClient::new(
            &account.session,
            timeout,
            proxy_url.as_deref(),
            endpoints.clone(),
        )
        .with_context(|| format!("Failed to create client for account {}", account.id))?;
        redeemers.push(AccountRedeemer::new(
            account.id,
            Arc::new(client),
            Arc::clone(&solver),
        ));
    }

    Ok(Pipeline::new(
        config.pipeline.clone(),
        announcements,
        AccountPool::new(redeemers),
    ))
}

fn create_solver(config: &Config) -> Result<Arc<dyn ChallengeSolver>> {
    match config.solver.mode {
        SolverMode::Manual => Ok(Arc::new(CallbackSolver::new(manual_prompt))),
        SolverMode::Ocr => bail!(
            "solver.mode = \"ocr\" has no built-in engine; embed snapcode-core \
             and provide a ChallengeSolver implementation"
        ),
    }
}

/// Human-in-the-loop challenge prompt. Saves the image to a temp file and
/// reads the answer from stdin; prompts are serialized so concurrent
/// accounts do not interleave on the terminal.
fn manual_prompt(image: Vec<u8>) -> Option<String> {
    static PROMPT_LOCK: Mutex<()> = Mutex::new(());
    static PROMPT_SEQ: AtomicU64 = AtomicU64::new(1);

    let _guard = PROMPT_LOCK.lock().ok()?;

    let seq = PROMPT_SEQ.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!("snapcode-captcha-{}.png", seq));
    if let Err(e) = std::fs::write(&path, &image) {
        error!("Failed to save captcha image: {}", e);
        return None;
    }

    print!("Captcha saved to {} - enter answer (blank to refresh): ", path.display());
    std::io::stdout().flush().ok()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer).ok()?;
    let _ = std::fs::remove_file(&path);

    let answer = answer.trim();
    if answer.is_empty() {
        None
    } else {
        Some(answer.to_string())
    }
}

/// Print the aggregate and the per-account report.
fn report(result: &PipelineResult) -> Result<()> {
    info!(
        "{} ({}/{} accounts succeeded{})",
        result.message,
        result.succeeded,
        result.total,
        if result.cancelled { ", cancelled" } else { "" }
    );

    let detail =
        serde_json::to_string_pretty(&result.results).context("Failed to encode results")?;
    println!("{}", detail);
    Ok(())
}
