//! `architect`: Stream agent spec files from the generation service.

use anyhow::{Context, Result};
use architect::actor::{InputActor, TickerActor};
use architect::app::App;
use architect::config::{ClientConfig, DEFAULT_ENDPOINT};
use architect::logging::init_logging;
use architect::session::Step;
use architect::surface::{TerminalSurface, TranscriptSurface};
use architect::transport::{HttpTransport, Transport};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "architect")]
#[command(about = "Describe an agent, get requirements, design and tasks")]
#[command(version)]
struct Cli {
    /// Generation endpoint
    #[arg(long, env = "ARCHITECT_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Display refresh rate while streaming
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Seconds to wait for the connection
    #[arg(long, default_value_t = 10)]
    connect_timeout_secs: u64,

    /// Directory for log files [default: <tmp>/architect]
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(long)]
    debug: bool,

    /// Generate once without the interactive UI; specs go to stdout
    #[arg(short, long)]
    prompt: Option<String>,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.endpoint.clone(),
            target_fps: self.fps,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            ..ClientConfig::default()
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_dir = cli
        .log_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("architect"));
    let _log_guard = init_logging(&log_dir, cli.debug).context("failed to set up logging")?;

    let config = cli.client_config();
    let transport: Arc<dyn Transport> =
        Arc::new(HttpTransport::new(&config).context("failed to build the HTTP client")?);
    info!(endpoint = %config.endpoint, fps = config.target_fps, "starting");

    match cli.prompt.as_deref() {
        Some(prompt) => run_headless(config, transport, prompt),
        None => run_interactive(config, transport),
    }
}

fn run_headless(config: ClientConfig, transport: Arc<dyn Transport>, prompt: &str) -> Result<ExitCode> {
    let ticker = TickerActor::spawn(config.frame_interval());
    let surface = TranscriptSurface::new(io::stdout(), io::stderr());
    let mut app = App::new(config, transport, surface);

    let step = app.run_until_settled(prompt, ticker.receiver());
    ticker.join();

    match step? {
        Step::Complete => Ok(ExitCode::SUCCESS),
        _ => Ok(ExitCode::FAILURE),
    }
}

fn run_interactive(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<ExitCode> {
    let (input_tx, input_rx) = crossbeam_channel::unbounded();
    let surface = TerminalSurface::enter().context("failed to set up the terminal")?;
    let input = InputActor::spawn(input_tx, config.input_poll_timeout);
    let ticker = TickerActor::spawn(config.frame_interval());

    let mut app = App::new(config, transport, surface);
    let result = app.run(&input_rx, ticker.receiver());

    input.join();
    ticker.join();
    // Restores the terminal before any error is printed
    drop(app);

    result.context("the interactive session failed")?;
    Ok(ExitCode::SUCCESS)
}
