//! Router configuration file from a subinterface table.
//!
//! Generates the full router configuration (subinterfaces, DHCP pools,
//! NAT roles and the NAT overload trailer) and writes it to the output
//! file named in the run configuration. Nothing is sent to a device.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example router_config -- --config netdeploy.toml
//! ```

use std::env;
use std::path::PathBuf;

use netdeploy::{FailurePolicy, RunConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = RunConfig::load(&args.config)?;
    let policy = if args.strict {
        FailurePolicy::AbortAll
    } else {
        FailurePolicy::ContinueAll
    };

    let generated = netdeploy::deploy::generate_router_config(&config.router, &policy)?;

    for row in generated.report.failed() {
        if let Some(e) = &row.error {
            eprintln!("line {}: skipped ({})", row.line, e);
        }
    }
    println!(
        "Wrote {} statements to {}",
        generated.commands.len(),
        config.router.output.display()
    );
    Ok(())
}

/// Simple argument parser (avoiding external dependencies)
struct Args {
    config: PathBuf,
    strict: bool,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut config = PathBuf::from("netdeploy.toml");
        let mut strict = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--config" | "-c" => {
                    i += 1;
                    if i < args.len() {
                        config = PathBuf::from(&args[i]);
                    }
                }
                "--strict" => strict = true,
                "--help" => {
                    println!(
                        r#"netdeploy router_config example

USAGE:
    cargo run --example router_config -- [OPTIONS]

OPTIONS:
    -c, --config <PATH>      Run configuration [default: netdeploy.toml]
    --strict                 Fail on the first invalid row instead of skipping it
    --help                   Print this help message
"#
                    );
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                }
            }
            i += 1;
        }

        Self { config, strict }
    }
}
