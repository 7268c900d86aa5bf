use crate::persist::SAVE_DIR;
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Runtime core of the miners idle game", long_about = None)]
pub struct Args {
    /// Directory holding one RON save per game.
    #[arg(long, default_value = SAVE_DIR)]
    pub data_dir: PathBuf,

    /// Keep saves in memory only; everything is lost on exit.
    #[arg(long)]
    pub in_memory: bool,

    #[arg(long, default_value_t = 60)]
    pub session_timeout_secs: u64,

    #[arg(long, default_value_t = 1_000)]
    pub tick_interval_ms: u64,

    #[arg(long, default_value_t = 5)]
    pub sweep_interval_secs: u64,

    #[arg(long, default_value_t = 60)]
    pub flush_interval_secs: u64,

    /// Largest gap (seconds) between the last save and re-entry that is still
    /// paid out; longer absences restart the clock.
    #[arg(long, default_value_t = 5)]
    pub grace_secs: u64,

    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    /// Do not read operator commands from stdin.
    #[arg(long)]
    pub no_console: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub session_timeout_secs: i64,
    pub tick_interval: Duration,
    pub sweep_interval: Duration,
    pub flush_interval: Duration,
    pub grace_secs: i64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            session_timeout_secs: 60,
            tick_interval: Duration::from_secs(1),
            sweep_interval: Duration::from_secs(5),
            flush_interval: Duration::from_secs(60),
            grace_secs: 5,
        }
    }
}

impl TryFrom<&Args> for RuntimeConfig {
    type Error = anyhow::Error;

    fn try_from(args: &Args) -> Result<Self> {
        for (name, value) in [
            ("session_timeout_secs", args.session_timeout_secs),
            ("tick_interval_ms", args.tick_interval_ms),
            ("sweep_interval_secs", args.sweep_interval_secs),
            ("flush_interval_secs", args.flush_interval_secs),
        ] {
            if value == 0 {
                bail!("{name} must be greater than zero");
            }
        }
        Ok(Self {
            session_timeout_secs: i64::try_from(args.session_timeout_secs)
                .context("session_timeout_secs is too large")?,
            tick_interval: Duration::from_millis(args.tick_interval_ms),
            sweep_interval: Duration::from_secs(args.sweep_interval_secs),
            flush_interval: Duration::from_secs(args.flush_interval_secs),
            grace_secs: i64::try_from(args.grace_secs).context("grace_secs is too large")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_runtime_defaults() {
        let args = Args::parse_from(["miners-runtime"]);
        let config = RuntimeConfig::try_from(&args).expect("defaults are valid");
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(args.data_dir, PathBuf::from(SAVE_DIR));
        assert_eq!(args.log_level, tracing::Level::INFO);
    }

    #[test]
    fn parses_overrides() {
        let args = Args::parse_from([
            "miners-runtime",
            "--in-memory",
            "--session-timeout-secs",
            "120",
            "--tick-interval-ms",
            "250",
            "--log-level",
            "debug",
        ]);
        let config = RuntimeConfig::try_from(&args).expect("config should parse");
        assert!(args.in_memory);
        assert_eq!(config.session_timeout_secs, 120);
        assert_eq!(config.tick_interval, Duration::from_millis(250));
        assert_eq!(args.log_level, tracing::Level::DEBUG);
    }

    #[test]
    fn rejects_timeout_beyond_i64() {
        let huge = u64::MAX.to_string();
        let args = Args::parse_from(["miners-runtime", "--session-timeout-secs", huge.as_str()]);
        let err = RuntimeConfig::try_from(&args).unwrap_err();
        assert!(
            err.to_string().contains("session_timeout_secs"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn rejects_zero_interval() {
        let args = Args::parse_from(["miners-runtime", "--sweep-interval-secs", "0"]);
        let err = RuntimeConfig::try_from(&args).unwrap_err();
        assert!(
            err.to_string().contains("sweep_interval_secs"),
            "unexpected error: {err}"
        );
    }
}
