use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{Parser, Subcommand};
use extractor_core::Quality;
use extractor_engine::DEFAULT_POLL_INTERVAL;

use super::config::DEFAULT_STATE_DIR;
use super::{AppConfig, LogDestination};

/// Command line of the extraction client.
#[derive(Debug, Parser)]
#[command(
    name = "extractor_app",
    version,
    about = "Turns video lectures into PDF notes through the extraction backend",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Video quality for new submissions (remembered)
    #[arg(long, global = true, value_parser = Quality::from_str)]
    pub quality: Option<Quality>,
    /// Where settings and the session live
    #[arg(long, global = true, env = "NOTES_EXTRACTOR_HOME", default_value = DEFAULT_STATE_DIR)]
    pub state_dir: PathBuf,
    /// Backend root for this run only
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    /// Status poll period in milliseconds
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval_ms: u64,
    /// Log destination: file, terminal or both
    #[arg(long = "log", global = true, default_value = "file", value_parser = LogDestination::from_str)]
    pub log_destination: LogDestination,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Submit a video url typed by hand
    Submit { url: String },
    /// Submit the url of the page being viewed
    Tab { url: String },
    /// Keep tracking the job left running by a previous session
    Resume,
    /// Ask the backend whether it is up
    Check,
}

/// What one run of the client should do.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub config: AppConfig,
    pub command: Command,
    pub quality: Option<Quality>,
}

impl Cli {
    pub fn into_invocation(self) -> Invocation {
        let config = AppConfig {
            state_dir: self.state_dir,
            api_url_override: self.api_url,
            poll_interval: Duration::from_millis(self.interval_ms),
            log_destination: self.log_destination,
            ..AppConfig::default()
        };
        Invocation {
            config,
            command: self.command,
            quality: self.quality,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    fn parse(args: &[&str]) -> Result<Invocation, clap::Error> {
        Cli::try_parse_from(std::iter::once("extractor_app").chain(args.iter().copied()))
            .map(Cli::into_invocation)
    }

    #[test]
    fn submit_with_options() {
        let invocation = parse(&[
            "--quality",
            "1080p",
            "submit",
            "https://youtu.be/abc",
            "--state-dir",
            "/tmp/x",
            "--interval-ms",
            "500",
            "--log",
            "both",
        ])
        .unwrap();
        assert_eq!(
            invocation.command,
            Command::Submit {
                url: "https://youtu.be/abc".to_string()
            }
        );
        assert_eq!(invocation.quality, Some(Quality::P1080));
        assert_eq!(invocation.config.state_dir, PathBuf::from("/tmp/x"));
        assert_eq!(invocation.config.poll_interval, Duration::from_millis(500));
        assert_eq!(invocation.config.log_destination, LogDestination::Both);
        assert_eq!(invocation.config.api_url_override, None);
    }

    #[test]
    fn defaults_apply_when_flags_are_absent() {
        let invocation = parse(&["resume", "--api-url", "http://backend:9000"]).unwrap();
        assert_eq!(invocation.command, Command::Resume);
        assert_eq!(invocation.quality, None);
        assert_eq!(invocation.config.poll_interval, Duration::from_millis(2000));
        assert_eq!(invocation.config.log_destination, LogDestination::File);
        assert_eq!(
            invocation.config.api_url_override.as_deref(),
            Some("http://backend:9000")
        );
    }

    #[test]
    fn no_command_prints_help() {
        let err = parse(&[]).unwrap_err();
        assert_eq!(
            err.kind(),
            ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
        assert_eq!(parse(&["--help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            parse(&["submit"]).unwrap_err().kind(),
            ErrorKind::MissingRequiredArgument
        );
        assert_eq!(
            parse(&["--quality", "4k", "check"]).unwrap_err().kind(),
            ErrorKind::ValueValidation
        );
        assert_eq!(
            parse(&["--interval-ms", "0", "check"]).unwrap_err().kind(),
            ErrorKind::ValueValidation
        );
        assert_eq!(
            parse(&["--log", "syslog", "check"]).unwrap_err().kind(),
            ErrorKind::ValueValidation
        );
        assert_eq!(
            parse(&["--verbose", "check"]).unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
        assert_eq!(
            parse(&["resume", "now"]).unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
        assert_eq!(
            parse(&["launch"]).unwrap_err().kind(),
            ErrorKind::InvalidSubcommand
        );
    }
}
