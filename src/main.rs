use clap::{CommandFactory, FromArgMatches, Parser, ValueEnum};
use mock_serialport::config::ConfigLoader;
use mock_serialport::logging::init_logging;
use mock_serialport::{framing, ClapFlags, Mock, MockResult, Options};
use std::path::PathBuf;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{info, warn};

// Command-line arguments. Bridge flags (--i, --o, --pid, --socat, --baudrate,
// --opts) are registered separately through ClapFlags.
#[derive(Parser, Debug)]
#[command(
    name = "mock-serialport",
    version,
    about = "Create a linked pty pair with socat and log or answer the traffic.",
    long_about = "Starts socat to link two pseudo-terminals. Point the program under test at the input device; this tool opens the output device and logs, echoes, or line-echoes what it receives until interrupted."
)]
struct Cli {
    /// Path to a TOML config file. Defaults to MOCK_SERIAL_CONFIG or ./mock-serial.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// What to do with received bytes.
    #[arg(long, value_enum, default_value_t = Mode::Log)]
    mode: Mode,

    /// Log process and traffic activity.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Log received bytes in hex
    Log,
    /// Send every received chunk back
    Echo,
    /// Send every newline-terminated line back
    Lines,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let defaults = mock_serialport::BridgeConfig::default();
    let mut flags = ClapFlags::new(Cli::command());
    defaults.set_flags(&mut flags);
    let matches = flags.into_command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let loader = match &cli.config {
        Some(path) => ConfigLoader::load_from(path)?,
        None => ConfigLoader::load()?,
    };
    let mut config = loader.into_config();
    config.bridge.apply_flags(&matches, "")?;
    if cli.verbose {
        config.bridge.verbose = true;
    }
    config.validate()?;

    init_logging(config.bridge.verbose, &config.logging);

    let options = Options::new(config.bridge.clone());
    let options = match cli.mode {
        Mode::Log => options,
        Mode::Echo => options.with_process(framing::echo()),
        Mode::Lines => options.with_process(framing::delimited(b'\n', |mock, line| {
            let mut reply = line.to_vec();
            reply.push(b'\n');
            if let Err(e) = mock.write(&reply) {
                warn!(error = %e, "line echo failed");
            }
        })),
    };

    let mut mock = Mock::new(options);
    let supervisor = mock.supervisor();
    let (done_tx, done_rx) = oneshot::channel::<MockResult<()>>();

    // The read loop blocks on the device, so it gets a plain thread that does
    // not hold up process exit.
    std::thread::Builder::new()
        .name("mock-reader".into())
        .spawn(move || {
            let _ = done_tx.send(mock.start());
        })?;

    info!(
        input = %config.bridge.input_file.display(),
        output = %config.bridge.output_file.display(),
        "bridge starting"
    );

    tokio::select! {
        finished = done_rx => {
            supervisor.terminate()?;
            match finished {
                Ok(result) => result?,
                Err(_) => warn!("reader thread exited without a result"),
            }
        }
        _ = shutdown_signal() => {
            info!("signal received, stopping bridge");
            supervisor.terminate()?;
        }
    }

    Ok(())
}

// --- Graceful Shutdown Handler ---
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
