//! Switch rollout: configure every switch in the table and back it up.
//!
//! Reads the switch table named in the run configuration, opens one SSH
//! session per row and pushes the generated VLAN, port and management
//! configuration. With archiving on, each switch then copies its
//! running-config to the built-in TFTP listener.
//!
//! # Prerequisites
//!
//! - A run configuration (TOML), see `netdeploy::config`
//! - A secrets file with `username`, `password` and `secret` keys
//! - Binding the TFTP port (69) usually needs elevated rights
//!
//! # Usage
//!
//! ```bash
//! cargo run --example switch_deploy -- --config netdeploy.toml --secrets secrets.toml
//! ```
//!
//! Stop at the first authentication failure:
//! ```bash
//! cargo run --example switch_deploy -- --config netdeploy.toml --secrets secrets.toml --abort-on auth
//! ```

use std::env;
use std::path::PathBuf;

use netdeploy::source::SwitchRow;
use netdeploy::{Credentials, ErrorKind, FailurePolicy, RunConfig, SshOpener};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = RunConfig::load(&args.config)?;
    let credentials = Credentials::from_secrets_file(&args.secrets)?;
    let rows = SwitchRow::read(&config.switch.input, config.switch.delimiter_byte()?)?;
    println!(
        "Loaded {} rows from {}",
        rows.len(),
        config.switch.input.display()
    );

    let opener = SshOpener::from_settings(&config.session)?;
    let report =
        netdeploy::deploy::deploy_switches(&config, &rows, &opener, &credentials, &args.policy)
            .await?;

    println!("{}", "-".repeat(50));
    for row in &report.rows {
        match &row.error {
            None if row.rejected == 0 => println!("line {:>3}  {:<16} ok", row.line, row.target),
            None => println!(
                "line {:>3}  {:<16} ok, {} statements rejected",
                row.line, row.target, row.rejected
            ),
            Some(e) => println!("line {:>3}  {:<16} FAILED: {}", row.line, row.target, e),
        }
    }
    println!("{}", "-".repeat(50));
    println!("{} of {} switches configured", report.succeeded(), rows.len());

    if report.failed().next().is_some() {
        std::process::exit(1);
    }
    Ok(())
}

/// Simple argument parser (avoiding external dependencies)
struct Args {
    config: PathBuf,
    secrets: PathBuf,
    policy: FailurePolicy,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut config = PathBuf::from("netdeploy.toml");
        let mut secrets = PathBuf::from("secrets.toml");
        let mut policy = FailurePolicy::ContinueAll;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--config" | "-c" => {
                    i += 1;
                    if i < args.len() {
                        config = PathBuf::from(&args[i]);
                    }
                }
                "--secrets" | "-s" => {
                    i += 1;
                    if i < args.len() {
                        secrets = PathBuf::from(&args[i]);
                    }
                }
                "--abort" => policy = FailurePolicy::AbortAll,
                "--abort-on" => {
                    i += 1;
                    if i < args.len() {
                        let kinds = args[i].split(',').filter_map(parse_kind).collect();
                        policy = FailurePolicy::AbortOn(kinds);
                    }
                }
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                }
            }
            i += 1;
        }

        Self {
            config,
            secrets,
            policy,
        }
    }

    fn print_help() {
        println!(
            r#"netdeploy switch_deploy example

USAGE:
    cargo run --example switch_deploy -- [OPTIONS]

OPTIONS:
    -c, --config <PATH>      Run configuration [default: netdeploy.toml]
    -s, --secrets <PATH>     Secrets file [default: secrets.toml]
    --abort                  Stop at the first failed row
    --abort-on <KINDS>       Stop only for these kinds (comma separated):
                             auth, unreachable, transport, archive,
                             invalid-vlan, invalid-ports, invalid-address
    --help                   Print this help message
"#
        );
    }
}

fn parse_kind(name: &str) -> Option<ErrorKind> {
    match name.trim() {
        "auth" => Some(ErrorKind::Auth),
        "unreachable" => Some(ErrorKind::Unreachable),
        "transport" => Some(ErrorKind::Transport),
        "archive" => Some(ErrorKind::Archive),
        "invalid-vlan" => Some(ErrorKind::InvalidVlan),
        "invalid-ports" => Some(ErrorKind::InvalidPortRange),
        "invalid-address" => Some(ErrorKind::InvalidAddress),
        other => {
            eprintln!("Unknown error kind: {}", other);
            None
        }
    }
}
