//! Command-line interface definitions for darkhost.

use clap::{Args, Parser, Subcommand};
use logging::LogArgs;

/// Command-line interface for the `darkhost` binary.
#[derive(Parser, Debug)]
#[command(
    name = "darkhost",
    about = "Browser window for the game client with a local control socket",
    version
)]
pub struct Cli {
    /// Logging controls
    #[command(flatten)]
    pub log: LogArgs,

    /// Game server base URL, e.g. https://int1.darkorbit.com
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Session id, sent as the `dosid` cookie
    #[arg(long, value_name = "SID")]
    pub sid: Option<String>,

    /// Open the game map directly instead of the start page
    #[arg(long)]
    pub launch: bool,

    /// Control socket path (defaults to a per-process path)
    #[arg(long, value_name = "PATH")]
    pub socket: Option<String>,

    /// Pause after each typed character, in milliseconds
    #[arg(long, env = "DARKHOST_TYPE_DELAY_MS", value_name = "MS")]
    pub type_delay_ms: Option<u64>,

    /// Optional subcommand; without one, the browser window is opened.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one control message to a running host and exit.
    Send(SendArgs),
}

/// Arguments for the `send` subcommand.
#[derive(Args, Debug, Clone)]
pub struct SendArgs {
    /// Process id of the target host
    #[arg(long, conflicts_with = "socket", required_unless_present = "socket")]
    pub pid: Option<u32>,

    /// Explicit socket path of the target host
    #[arg(long, value_name = "PATH")]
    pub socket: Option<String>,

    /// Message to send, e.g. `keyClick|13` or `text|hello`
    #[arg(value_name = "MESSAGE")]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_launch_flags() {
        let cli = Cli::parse_from([
            "darkhost",
            "--url",
            "https://int1.darkorbit.com",
            "--sid",
            "abc",
            "--launch",
        ]);
        assert_eq!(cli.url.as_deref(), Some("https://int1.darkorbit.com"));
        assert_eq!(cli.sid.as_deref(), Some("abc"));
        assert!(cli.launch);
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_send() {
        let cli = Cli::parse_from(["darkhost", "send", "--pid", "42", "keyClick|13"]);
        let Some(Commands::Send(args)) = cli.command else {
            panic!("expected send");
        };
        assert_eq!(args.pid, Some(42));
        assert_eq!(args.message, "keyClick|13");
        assert!(Cli::try_parse_from(["darkhost", "send", "refresh"]).is_err());
    }
}
