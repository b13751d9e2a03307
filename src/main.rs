use clap::Parser;
use page_replacement_sim::config::Config;
use page_replacement_sim::run_simulation;
use std::env;
use std::process;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn init_msg() {
    println!("page replacement simulation");
}

fn init_logging() {
    let log_level = match env::var("LOG_LEVEL") {
        Ok(v) => match v.to_uppercase().as_str() {
            "ERROR" => Level::ERROR,
            "WARN" => Level::WARN,
            "INFO" => Level::INFO,
            "DEBUG" => Level::DEBUG,
            "TRACE" => Level::TRACE,
            _ => {
                eprintln!("Invalid LOG_LEVEL '{}', defaulting to INFO", v);
                Level::INFO
            }
        },
        Err(_) => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("a global tracing subscriber is already installed");
    }
    info!("log level set to {:?}", log_level);
}

fn main() {
    init_msg();
    init_logging();
    let config = Config::parse();
    config.display();
    if let Err(err) = config.validate() {
        eprintln!("{}", err);
        process::exit(1);
    }
    println!();
    if let Err(err) = run_simulation(config) {
        eprintln!("{}", err);
        process::exit(1);
    }
}
