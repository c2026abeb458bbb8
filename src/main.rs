mod check;
mod collectors;
mod config;
mod error;
mod metrics;
mod models;

use anyhow::{Context, Result};
use check::Checker;
use clap::Parser;
use collectors::smartctl::Smartctl;
use config::Config;
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "smartcheck",
    about = "Disk health check using smartctl, printing one metric line per device",
    version
)]
struct Cli {
    /// Measurement name at the start of each line (default: binary name)
    #[arg(long)]
    name: Option<String>,

    /// Path of smartctl
    #[arg(long)]
    smartctl: Option<String>,

    /// SMART attribute IDs to report (comma-separated or repeated)
    #[arg(long, value_delimiter = ',')]
    attrs: Option<Vec<u32>>,

    /// Also report flag, type, updated, when_failed and raw value notes
    #[arg(long)]
    detailed: bool,

    /// Leave attribute names out of field keys
    #[arg(long)]
    no_names: bool,

    /// Config file (default: ~/.config/smartcheck/smartcheck.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logs, including every smartctl invocation
    #[arg(long)]
    debug: bool,

    /// Output logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Print a JSON snapshot of every device instead of metric lines
    #[arg(long)]
    json: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    /// Command-line flags take precedence over the config file.
    fn apply(&self, cfg: &mut Config) {
        if let Some(name) = &self.name {
            cfg.general.name = name.clone();
        }
        if let Some(path) = &self.smartctl {
            cfg.general.smartctl = path.clone();
        }
        if let Some(ids) = &self.attrs {
            cfg.attributes.ids = ids.clone();
        }
        if self.detailed {
            cfg.attributes.detailed = true;
        }
        if self.no_names {
            cfg.attributes.use_names = false;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug, cli.log_json);

    let (mut cfg, source) = Config::load(cli.config.as_deref())?;
    cli.apply(&mut cfg);
    debug!(config = ?source, "configuration loaded");

    if cli.print_config {
        return run_print_config(&cfg, source);
    }

    let checker = Checker::new(Smartctl::new(cfg.general.smartctl.clone()), &cfg);
    if cli.json {
        return run_json_snapshot(&checker);
    }
    run_lines(&checker, &cfg)
}

fn init_logging(debug: bool, json: bool) {
    let level = if debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    // stdout carries metric lines only
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

fn hostname() -> Result<String> {
    let host = nix::unistd::gethostname().context("reading hostname")?;
    Ok(host.to_string_lossy().into_owned())
}

fn run_lines(checker: &Checker<Smartctl>, cfg: &Config) -> Result<()> {
    let host = hostname()?;
    for dev in checker.scan()? {
        let report = checker.check_device(&dev);
        println!("{}", metrics::render_line(&cfg.general.name, &host, &report.device, &report.fields));
    }
    Ok(())
}

fn run_json_snapshot(checker: &Checker<Smartctl>) -> Result<()> {
    use serde_json::json;

    let devices = checker.run()?;
    let snapshot = json!({
        "host":      hostname()?,
        "timestamp": chrono::Local::now().to_rfc3339(),
        "devices":   devices,
    });
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn run_print_config(cfg: &Config, source: Option<PathBuf>) -> Result<()> {
    let path = source
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "(defaults)".to_string());
    println!("# Config: {}", path);
    println!();
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "smartcheck", "--name", "disks", "--attrs", "5,197", "--attrs", "198", "--detailed", "--no-names",
        ]);
        let mut cfg = Config::default();
        cli.apply(&mut cfg);
        assert_eq!(cfg.general.name, "disks");
        assert_eq!(cfg.general.smartctl, "/usr/sbin/smartctl");
        assert_eq!(cfg.attributes.ids, vec![5, 197, 198]);
        assert!(cfg.attributes.detailed);
        assert!(!cfg.attributes.use_names);
    }

    #[test]
    fn no_flags_keep_config() {
        let cli = Cli::parse_from(["smartcheck"]);
        let mut cfg = Config::parse("[attributes]\nids = [9]\n").unwrap();
        cli.apply(&mut cfg);
        assert_eq!(cfg.attributes.ids, vec![9]);
        assert!(cfg.attributes.use_names);
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
