use std::env;
use std::fs::OpenOptions;
use std::process::ExitCode;

use env_logger::{Env, Target};

#[cfg(feature = "cli")]
use tubefetch::cli::{CliArgs, Command, USAGE};

/// Sends log output to stderr, or to `tubefetch.log` in the data dir while
/// the TUI owns the terminal.
fn init_logging(tui: bool) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    if tui {
        let dir = dirs::data_dir()
            .unwrap_or_else(env::temp_dir)
            .join("tubefetch");
        let file = std::fs::create_dir_all(&dir).and_then(|()| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("tubefetch.log"))
        });
        match file {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            // Logging to the terminal would corrupt the screen.
            Err(_) => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }
    builder.init();
}

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> ExitCode {
    let raw: Vec<String> = env::args().skip(1).collect();
    let args = match CliArgs::parse(&raw) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    init_logging(args.command == Command::Tui);

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = if args.command == Command::Tui {
        #[cfg(feature = "tui")]
        {
            tubefetch::tui::run(config).await.map(|()| ExitCode::SUCCESS)
        }
        #[cfg(not(feature = "tui"))]
        {
            let _ = config;
            eprintln!("TUI support not compiled in");
            return ExitCode::FAILURE;
        }
    } else {
        tubefetch::cli::run(args.command, config).await
    };

    result.unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        ExitCode::FAILURE
    })
}

#[cfg(not(feature = "cli"))]
#[tokio::main]
async fn main() -> ExitCode {
    if !env::args().skip(1).any(|a| a == "--tui") {
        eprintln!("CLI support not compiled in; run with --tui");
        return ExitCode::FAILURE;
    }
    init_logging(true);

    #[cfg(feature = "tui")]
    {
        let config = tubefetch::ClientConfig::load_or_create(&tubefetch::ClientConfig::default_path())
            .map(tubefetch::ClientConfig::with_env_overrides);
        match config {
            Ok(config) => match tubefetch::tui::run(config).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Error: {e}");
                    ExitCode::FAILURE
                }
            },
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        }
    }
    #[cfg(not(feature = "tui"))]
    {
        eprintln!("TUI support not compiled in");
        ExitCode::FAILURE
    }
}
