//! Launch settings: which page the window opens and how the host behaves.

use std::time::Duration;

use relaykey::DEFAULT_TYPE_DELAY;

use crate::cli::Cli;

/// Page opened when no url/session pair is given.
pub const DEFAULT_URL: &str = "https://darkorbit.com";

/// User agent the game servers expect from the desktop client.
pub const USER_AGENT: &str = "BigpointClient/1.6.7";

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "dosid";

/// Initial window size (logical pixels).
pub const WINDOW_SIZE: (f64, f64) = (1400.0, 900.0);

/// A page to load, plus the session cookie to attach for its origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Destination {
    /// Full URL to load.
    pub url: String,
    /// Base URL the session cookie belongs to, and its value.
    pub session: Option<Session>,
}

/// Session cookie binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    /// Base URL of the game server.
    pub base_url: String,
    /// `dosid` value.
    pub sid: String,
}

impl Session {
    /// `Cookie` header value for this session.
    pub fn cookie(&self) -> String {
        format!("{}={}", SESSION_COOKIE, self.sid)
    }
}

/// Everything the host needs to start.
#[derive(Clone, Debug)]
pub struct LaunchSettings {
    /// Page the first window opens.
    pub destination: Destination,
    /// Page windows opened with Control+N load. Always the start page, even
    /// when the first window launched straight into the map.
    pub extra_destination: Destination,
    /// Explicit control socket path; `None` uses the per-process default.
    pub socket_path: Option<String>,
    /// Pause after each typed character.
    pub type_delay: Duration,
}

impl LaunchSettings {
    /// Build settings from parsed CLI flags.
    pub fn from_cli(cli: &Cli) -> Self {
        let (url, sid) = (cli.url.as_deref(), cli.sid.as_deref());
        Self {
            destination: destination(url, sid, cli.launch),
            extra_destination: destination(url, sid, false),
            socket_path: cli.socket.clone(),
            type_delay: cli
                .type_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_TYPE_DELAY),
        }
    }

    /// Window title.
    pub fn title() -> String {
        format!("DarkBot Browser v{}", env!("CARGO_PKG_VERSION"))
    }
}

/// Resolve the page to open.
///
/// With both `url` and `sid`, opens the game's internal start page (or the
/// map directly when `launch` is set) with the session cookie attached.
/// Otherwise falls back to [`DEFAULT_URL`].
pub fn destination(url: Option<&str>, sid: Option<&str>, launch: bool) -> Destination {
    match (url, sid) {
        (Some(url), Some(sid)) if !url.is_empty() && !sid.is_empty() => {
            let base = url.trim_end_matches('/');
            let action = if launch {
                "internalMapRevolution"
            } else {
                "internalStart"
            };
            Destination {
                url: format!("{base}/indexInternal.es?action={action}"),
                session: Some(Session {
                    base_url: base.to_string(),
                    sid: sid.to_string(),
                }),
            }
        }
        _ => Destination {
            url: DEFAULT_URL.to_string(),
            session: None,
        },
    }
}
