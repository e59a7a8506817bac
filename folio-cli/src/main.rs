mod cli;

use clap::Parser;
use env_logger::{Builder, Env};
use folio_core::config::Config;

const ENV_LOG: &str = "FOLIO_LOG";
const ENV_LOG_STYLE: &str = "FOLIO_LOG_STYLE";

fn main() {
    // Setup logging from the env variables, with defaults.
    Builder::from_env(
        Env::new()
            .filter_or(ENV_LOG, "info")
            .write_style(ENV_LOG_STYLE),
    )
    .init();

    let args = cli::Cli::parse();
    let config = Config::load().unwrap_or_default();

    if let Err(err) = args.run(config) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
