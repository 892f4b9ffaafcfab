use clap::Parser;
use stubgen::cli::{run_cli, Cli};
use stubgen::logging::{init_logging_with_config, LogConfig};

fn main() {
    if let Err(e) = init_logging_with_config(&LogConfig::from_env()) {
        eprintln!("Failed to initialize logging: {e:#}");
    }

    let cli = Cli::parse();
    if let Err(e) = run_cli(cli) {
        eprintln!("❌ {e:#}");
        std::process::exit(1);
    }
}
