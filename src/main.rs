use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use screenshot_harness::harness::{with_session, HarnessConfig};
use screenshot_harness::screenshot::{capture, navigate_and_settle, BrowserProfile, RemoteSession, ScreenshotRequest};
use screenshot_harness::utils::logger::init_logger;

/// Navigate a remote browser to one URL and save a screenshot of it
#[derive(Debug, Parser)]
#[command(name = "screenshot-harness", version)]
struct Cli {
    /// Page to load
    #[arg(long)]
    url: url::Url,

    /// Screenshot file name, without the .png extension
    #[arg(long)]
    name: String,

    /// Output directory (defaults to the configured screenshot directory)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Remote WebDriver endpoint, e.g. http://localhost:4444/wd/hub
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Browser capability profile: chrome or firefox
    #[arg(long)]
    browser: Option<BrowserProfile>,

    /// Harness config file (TOML, YAML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra pause after the page is ready, in milliseconds
    #[arg(long)]
    settle_ms: Option<u64>,

    /// Write logs to a timestamped file in this directory instead of stderr
    #[arg(long)]
    log_dir: Option<String>,
}

#[actix_web::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.log_dir.as_deref())?;

    let mut config = HarnessConfig::load(cli.config.as_deref())?;
    if let Some(webdriver_url) = cli.webdriver_url {
        config.webdriver_url = webdriver_url;
    }
    if let Some(browser) = cli.browser {
        config.browser = browser;
    }
    if let Some(settle_ms) = cli.settle_ms {
        config.settle_delay_ms = settle_ms;
    }

    let out_dir = cli.out.unwrap_or_else(|| config.screenshot_dir());
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create directory: {}", out_dir.display()))?;
    let request = ScreenshotRequest::new(&out_dir, &cli.name)?;

    let readiness = config.readiness();
    info!(
        "Capturing {} with {} via {} (settle {:?})",
        cli.url,
        config.browser.browser_name(),
        config.webdriver_url,
        Duration::from_millis(config.settle_delay_ms)
    );

    let session = RemoteSession::connect(&config.session_settings()).await?;
    let path = with_session(session, |session| {
        Box::pin(async move {
            navigate_and_settle(session, cli.url.as_str(), &readiness).await?;
            Ok(capture(session, &request).await?)
        })
    })
    .await?;

    println!("{}", path.display());
    Ok(())
}
