use anyhow::{Context, Result};
use powtool::{cli, commands, ui, Config};
use std::process;
use tracing::error;

fn main() {
    let args = cli::parse_args();
    init_logging(&args);

    match run(&args) {
        Ok(report) => {
            ui::print_report(&report);
            if report.verdict == Some(false) {
                process::exit(2);
            }
        }
        Err(e) => {
            ui::print_status("✗", &format!("{e:#}"), ui::StatusType::Error);
            error!("{e:#}");
            process::exit(1);
        }
    }
}

fn run(args: &cli::Args) -> Result<commands::Report> {
    let mut config = match &args.config_path {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };
    config.apply_cli_overrides(args)?;
    commands::run(&config, &args.command)
}

fn init_logging(args: &cli::Args) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}
