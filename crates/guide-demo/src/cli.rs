#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo walkthrough.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `GUIDE_DEMO_*` prefix.

use std::env;
use std::path::PathBuf;
use std::process;

use guide_core::geometry::Size;
use guide_runtime::DEFAULT_SETTLE_DELAY_MS;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
Guided tour engine demo: scripted dashboard walkthrough

USAGE:
    guide-demo [OPTIONS]

OPTIONS:
    --catalog=PATH       Load tours from a JSON catalog instead of the built-in one
    --state-file=PATH    Completion state file (default: per-profile state dir)
    --profile=NAME       Profile for the default state file (default: default)
    --in-memory          Do not persist completions
    --viewport=WxH       Viewport size in pixels (default: 1280x800)
    --settle-ms=N        Auto-start settling delay (default: 1500)
    --tour=ID            Start this tour instead of waiting for auto-start
    --reset              Clear stored progress before starting
    --help, -h           Show this help message
    --version, -V        Show version

ENVIRONMENT VARIABLES:
    GUIDE_DEMO_CATALOG       Override --catalog
    GUIDE_DEMO_STATE_FILE    Override --state-file
    GUIDE_DEMO_PROFILE       Override --profile
    GUIDE_DEMO_VIEWPORT      Override --viewport
    GUIDE_DEMO_SETTLE_MS     Override --settle-ms
    RUST_LOG                 Log filter (default: info)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    pub catalog: Option<PathBuf>,
    pub state_file: Option<PathBuf>,
    pub profile: String,
    pub in_memory: bool,
    pub viewport: Size,
    pub settle_ms: u64,
    pub tour: Option<String>,
    pub reset: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            catalog: None,
            state_file: None,
            profile: "default".into(),
            in_memory: false,
            viewport: Size::new(1280.0, 800.0),
            settle_ms: DEFAULT_SETTLE_DELAY_MS,
            tour: None,
            reset: false,
        }
    }
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

/// Parse `WxH`, e.g. `1280x800`.
pub fn parse_viewport(value: &str) -> Option<Size> {
    let (w, h) = value.split_once(['x', 'X'])?;
    let w: f64 = w.trim().parse().ok()?;
    let h: f64 = h.trim().parse().ok()?;
    (w > 0.0 && h > 0.0).then(|| Size::new(w, h))
}

impl Opts {
    /// Parse process arguments and environment, exiting on help, version, or
    /// invalid input.
    pub fn parse() -> Self {
        let args: Vec<String> = env::args().skip(1).collect();
        match Self::parse_from(&args, |key| env::var(key).ok()) {
            Ok(Command::Run(opts)) => opts,
            Ok(Command::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Command::Version) => {
                println!("guide-demo {VERSION}");
                process::exit(0);
            }
            Err(message) => {
                eprintln!("{message}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` with `env` as the variable lookup.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags.
    pub fn parse_from<F>(args: &[String], env: F) -> Result<Command, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        if let Some(val) = env("GUIDE_DEMO_CATALOG") {
            opts.catalog = Some(PathBuf::from(val));
        }
        if let Some(val) = env("GUIDE_DEMO_STATE_FILE") {
            opts.state_file = Some(PathBuf::from(val));
        }
        if let Some(val) = env("GUIDE_DEMO_PROFILE") {
            opts.profile = val;
        }
        if let Some(val) = env("GUIDE_DEMO_VIEWPORT")
            && let Some(size) = parse_viewport(&val)
        {
            opts.viewport = size;
        }
        if let Some(val) = env("GUIDE_DEMO_SETTLE_MS")
            && let Ok(n) = val.parse()
        {
            opts.settle_ms = n;
        }

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Command::Help),
                "--version" | "-V" => return Ok(Command::Version),
                "--in-memory" => opts.in_memory = true,
                "--reset" => opts.reset = true,
                other => {
                    if let Some(val) = other.strip_prefix("--catalog=") {
                        opts.catalog = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--state-file=") {
                        opts.state_file = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--profile=") {
                        opts.profile = val.to_string();
                    } else if let Some(val) = other.strip_prefix("--tour=") {
                        opts.tour = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--viewport=") {
                        opts.viewport = parse_viewport(val)
                            .ok_or_else(|| format!("Invalid --viewport value: {val}"))?;
                    } else if let Some(val) = other.strip_prefix("--settle-ms=") {
                        opts.settle_ms = val
                            .parse()
                            .map_err(|_| format!("Invalid --settle-ms value: {val}"))?;
                    } else {
                        return Err(format!("Unknown argument: {other}"));
                    }
                }
            }
        }

        Ok(Command::Run(opts))
    }
}
