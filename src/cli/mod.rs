//! CLI mode for tubefetch - one command per invocation.

mod progress;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::{Backend, HttpBackend};
use crate::config::ClientConfig;
use crate::controller::SessionController;
use crate::event::SessionEvent;
use crate::model::Quality;
use crate::url::is_playlist_url;
use crate::{Error, Result};

pub use progress::TerminalView;

pub const USAGE: &str = "\
Usage: tubefetch [OPTIONS] <COMMAND>
       tubefetch --tui [OPTIONS]

Commands:
  info <url>                     Show video or playlist details
  video <url> [--quality Q]      Download a single video
  playlist <url> [--quality Q]   Download every video of a playlist
  clear                          Remove the server's temporary downloads

Options:
  --server <URL>     Backend base URL (default: http://127.0.0.1:5000)
  --config <PATH>    Config file (default: <config dir>/tubefetch/config.toml)
  --keep             Do not clear the server's downloads before downloading
  --tui              Launch the interactive terminal UI
  -h, --help         Show this help";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Info(String),
    Video { url: String, quality: Quality },
    Playlist { url: String, quality: Quality },
    Clear,
    Tui,
    Help,
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub command: Command,
    pub server: Option<String>,
    pub config: Option<PathBuf>,
    pub keep: bool,
}

impl CliArgs {
    /// Parses arguments (without the program name).
    ///
    /// # Errors
    /// Returns [`Error::Validation`] describing the first problem found.
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut server = None;
        let mut config = None;
        let mut keep = false;
        let mut tui = false;
        let mut help = false;
        let mut quality = Quality::Best;
        let mut positional = Vec::new();

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--tui" => tui = true,
                "--keep" => keep = true,
                "-h" | "--help" => help = true,
                "--server" => server = Some(value(&mut iter, "--server")?),
                "--config" => config = Some(PathBuf::from(value(&mut iter, "--config")?)),
                "-q" | "--quality" => quality = Quality::from(value(&mut iter, "--quality")?),
                flag if flag.starts_with('-') => {
                    return Err(Error::Validation(format!("Unknown option: {flag}")));
                }
                _ => positional.push(arg.clone()),
            }
        }

        let command = if help {
            Command::Help
        } else if tui {
            Command::Tui
        } else {
            let mut positional = positional.into_iter();
            let name = positional.next();
            let url = positional.next().unwrap_or_default();
            match name.as_deref() {
                Some("info") => Command::Info(url),
                Some("video") => Command::Video { url, quality },
                Some("playlist") => Command::Playlist { url, quality },
                Some("clear") => Command::Clear,
                Some(other) => {
                    return Err(Error::Validation(format!("Unknown command: {other}")));
                }
                None => Command::Help,
            }
        };

        Ok(Self {
            command,
            server,
            config,
            keep,
        })
    }

    /// Loads the config file and applies environment and flag overrides.
    ///
    /// Without `--config`, a default file is written on first use. An
    /// explicit path that does not exist yields the defaults.
    ///
    /// # Errors
    /// Returns an error if the config file cannot be read, parsed or created.
    pub fn load_config(&self) -> Result<ClientConfig> {
        let config = match &self.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::load_or_create(&ClientConfig::default_path())?,
        };
        let mut config = config.with_env_overrides();
        if let Some(server) = &self.server {
            config = config.with_base_url(server.as_str());
        }
        if self.keep {
            config = config.with_clear_on_start(false);
        }
        Ok(config)
    }
}

fn value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<String> {
    iter.next()
        .cloned()
        .ok_or_else(|| Error::Validation(format!("{flag} requires a value")))
}

/// Runs a single CLI command.
///
/// Failures the controller reports are printed by the view and yield
/// [`ExitCode::FAILURE`]; only setup problems are returned as errors.
///
/// # Errors
/// Returns an error if the HTTP client cannot be built.
pub async fn run(command: Command, config: ClientConfig) -> Result<ExitCode> {
    let backend = Arc::new(HttpBackend::from_config(&config.server)?);
    let view = TerminalView::new(backend.base_url());
    let (mut controller, mut events) = SessionController::new(backend, view, config);

    let result = match command {
        Command::Info(url) => controller.fetch_info(&url).await.map(drop),
        Command::Clear => controller.clear_downloads().await,
        Command::Video { url, quality } => {
            download(&mut controller, &mut events, &url, &quality, false).await
        }
        Command::Playlist { url, quality } => {
            download(&mut controller, &mut events, &url, &quality, true).await
        }
        Command::Tui | Command::Help => {
            println!("{USAGE}");
            return Ok(ExitCode::SUCCESS);
        }
    };

    if let Err(e) = result {
        log::debug!("Command failed: {e}");
        return Ok(ExitCode::FAILURE);
    }
    if controller.view().failed() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

async fn download<B: Backend + ?Sized + 'static>(
    controller: &mut SessionController<B, TerminalView>,
    events: &mut mpsc::UnboundedReceiver<SessionEvent>,
    url: &str,
    quality: &Quality,
    playlist: bool,
) -> Result<()> {
    if let Err(e) = controller.initialize().await {
        log::warn!("Start-up clear failed: {e}");
    }

    if playlist {
        controller.fetch_info(url).await?;
        if !controller.playlist_qualities().offers(quality) {
            log::warn!("Quality {quality} is not a playlist preset");
        }
        controller.start_playlist_download(url, quality).await?;
    } else {
        if is_playlist_url(url) {
            log::warn!("{url} belongs to a playlist; only this video is downloaded");
        }
        controller.fetch_info(url).await?;
        if !controller.video_qualities().offers(quality) {
            log::warn!("Quality {quality} is not offered for this video");
        }
        controller.start_video_download(url, quality).await?;
    }

    let interrupted = tokio::select! {
        () = controller.run_until_idle(events) => false,
        _ = tokio::signal::ctrl_c() => true,
    };
    if interrupted {
        controller.shutdown();
        return Err(Error::Validation("Interrupted".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parses_video_command() {
        let parsed = CliArgs::parse(&args(&[
            "video",
            "https://youtu.be/abc",
            "--quality",
            "720p",
            "--keep",
        ]))
        .unwrap();
        assert_eq!(
            parsed.command,
            Command::Video {
                url: "https://youtu.be/abc".to_string(),
                quality: Quality::from("720p"),
            }
        );
        assert!(parsed.keep);
    }

    #[test]
    fn quality_defaults_to_best() {
        let parsed = CliArgs::parse(&args(&["playlist", "https://youtube.com/playlist?list=PL"])).unwrap();
        assert!(matches!(parsed.command, Command::Playlist { quality: Quality::Best, .. }));
    }

    #[test]
    fn global_flags() {
        let parsed =
            CliArgs::parse(&args(&["--server", "http://nas:5000", "--config", "/tmp/c.toml", "clear"])).unwrap();
        assert_eq!(parsed.command, Command::Clear);
        assert_eq!(parsed.server.as_deref(), Some("http://nas:5000"));
        assert_eq!(parsed.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn tui_and_help() {
        assert_eq!(CliArgs::parse(&args(&["--tui"])).unwrap().command, Command::Tui);
        assert_eq!(CliArgs::parse(&args(&[])).unwrap().command, Command::Help);
        assert_eq!(CliArgs::parse(&args(&["info", "x", "-h"])).unwrap().command, Command::Help);
    }

    #[test]
    fn missing_url_is_left_for_controller() {
        let parsed = CliArgs::parse(&args(&["info"])).unwrap();
        assert_eq!(parsed.command, Command::Info(String::new()));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(CliArgs::parse(&args(&["download", "x"])).is_err());
        assert!(CliArgs::parse(&args(&["--bogus"])).is_err());
        assert!(CliArgs::parse(&args(&["video", "x", "--quality"])).is_err());
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        ClientConfig::default()
            .with_base_url("http://from-file:5000")
            .save(&path)
            .unwrap();

        let mut parsed = CliArgs::parse(&args(&["--keep", "clear"])).unwrap();
        parsed.config = Some(path);
        parsed.server = Some("http://flag:5000/".to_string());

        let config = parsed.load_config().unwrap();
        assert_eq!(config.server.base_url, "http://flag:5000");
        assert!(!config.session.clear_on_start);
    }

    #[test]
    fn explicit_missing_config_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let mut parsed = CliArgs::parse(&args(&["clear"])).unwrap();
        parsed.config = Some(path.clone());

        let config = parsed.load_config().unwrap();
        assert_eq!(config.session, ClientConfig::default().session);
        assert!(!path.exists());
    }
}
