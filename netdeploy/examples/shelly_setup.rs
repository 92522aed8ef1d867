//! Shelly plug provisioning.
//!
//! Joining a plug's access point is left to the operator: pass the SSIDs
//! you see with `--ssid` (repeatable) and connect to each one when asked.
//! Every plug gets a name, MQTT settings and the station Wi-Fi from the
//! `[plug]` section of the run configuration.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example shelly_setup -- --config netdeploy.toml --ssid shellyplug-s-7C87CE
//! ```

use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use netdeploy::RunConfig;
use netdeploy::config::read_secret_file;
use netdeploy::error::PlugError;
use netdeploy::plug::WifiAdapter;
use secrecy::SecretString;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = RunConfig::load(&args.config)?;
    let wifi_password = read_secret_file(&config.plug.wifi_password_file)?;

    let wifi = ManualWifi {
        networks: args.ssids,
    };
    let reports = netdeploy::deploy::provision_plugs(&wifi, &config.plug, &wifi_password).await?;

    for report in &reports {
        if report.is_complete() {
            println!("{}: done", report.name);
        } else {
            println!("{}: {} settings failed", report.name, report.failed.len());
            for (request, e) in &report.failed {
                println!("    {} ({})", request, e);
            }
        }
    }
    println!("{} plug(s) configured", reports.len());
    Ok(())
}

/// Asks the operator to join each network by hand.
struct ManualWifi {
    networks: Vec<String>,
}

impl WifiAdapter for ManualWifi {
    async fn scan_networks(&self) -> Result<Vec<String>, PlugError> {
        Ok(self.networks.clone())
    }

    async fn connect(&self, ssid: &str, _password: Option<&SecretString>) -> Result<bool, PlugError> {
        let ssid = ssid.to_string();
        tokio::task::spawn_blocking(move || {
            print!("Join '{}' and press Enter (or type 'skip'): ", ssid);
            io::stdout().flush().map_err(wifi_error)?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line).map_err(wifi_error)?;
            Ok::<_, PlugError>(line.trim() != "skip")
        })
        .await
        .map_err(|e| PlugError::Wifi {
            message: e.to_string(),
        })?
    }
}

fn wifi_error(e: io::Error) -> PlugError {
    PlugError::Wifi {
        message: e.to_string(),
    }
}

/// Simple argument parser (avoiding external dependencies)
struct Args {
    config: PathBuf,
    ssids: Vec<String>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut config = PathBuf::from("netdeploy.toml");
        let mut ssids = Vec::new();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--config" | "-c" => {
                    i += 1;
                    if i < args.len() {
                        config = PathBuf::from(&args[i]);
                    }
                }
                "--ssid" => {
                    i += 1;
                    if i < args.len() {
                        ssids.push(args[i].clone());
                    }
                }
                "--help" => {
                    println!(
                        r#"netdeploy shelly_setup example

USAGE:
    cargo run --example shelly_setup -- [OPTIONS]

OPTIONS:
    -c, --config <PATH>      Run configuration [default: netdeploy.toml]
    --ssid <SSID>            Visible network name, repeatable
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

        Self { config, ssids }
    }
}
