use crate::config_loader::{load_config, CliOverrides};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

/// Console Quill - capture console.log messages from web pages
#[derive(Parser, Debug)]
#[command(name = "console-quill", version)]
pub struct Cli {
    /// Path to the log file
    #[arg(long)]
    pub logfile: PathBuf,

    /// Port to run the server on (default: 9876)
    #[arg(long)]
    pub port: Option<u16>,

    /// Host/IP to bind (default: localhost)
    #[arg(long)]
    pub host: Option<String>,

    /// Serve the capture script from this file. Defaults to static/console-quill.js
    /// next to the executable, then the copy in the source tree
    #[arg(long = "script", value_name = "PATH")]
    pub script_path: Option<PathBuf>,

    /// Emit one log line per HTTP request (`--access-log=false` turns it off)
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub access_log: Option<bool>,

    /// TOML configuration file; must exist when given (default: console-quill.toml if present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            logfile: Some(self.logfile.clone()),
            host: self.host.clone(),
            port: self.port,
            script_path: self.script_path.clone(),
            access_log: self.access_log,
        }
    }
}

/// Resolve configuration and run the server to completion.
pub fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref(), &cli.overrides()).context("Failed to load config")?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    rt.block_on(crate::server::run(config))
        .context("Error starting server")?;

    Ok(())
}
