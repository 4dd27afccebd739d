extern crate degenotate;
extern crate env_logger;

use std::process;

use degenotate::config::{self, Config};
use degenotate::pipeline;

fn main() {
    let matches = config::app().get_matches();

    let config = match Config::from_matches(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error {}: {}", e.code(), e);
            process::exit(1);
        },
    };

    env_logger::Builder::new()
        .filter_level(config.log_level)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    log::debug!("{:?}", config);

    if let Err(e) = pipeline::run(&config) {
        eprintln!("error {}: {}", e.code(), e);
        process::exit(1);
    }
}
