//! Switch rollout: one SSH session per table row.

use log::{info, warn};

use super::{FailurePolicy, RowOutcome, RunReport};
use crate::archive::Archiver;
use crate::assemble::SwitchAssembler;
use crate::builder::CommandList;
use crate::config::{Credentials, RunConfig};
use crate::driver::{DeviceSession, SessionOpener};
use crate::error::{BuildError, Result};
use crate::source::SwitchRow;
use crate::tftp::{TftpHandle, TftpServer};

/// Configure every switch in `rows` and back up its running-config.
///
/// Rows are handled one at a time: open, elevate, apply, archive, close.
/// When archiving is on and the built-in listener is enabled, the TFTP
/// server is started first and must be ready before any row runs.
pub async fn deploy_switches<O: SessionOpener>(
    config: &RunConfig,
    rows: &[SwitchRow],
    opener: &O,
    credentials: &Credentials,
    policy: &FailurePolicy,
) -> Result<RunReport> {
    let assembler = SwitchAssembler::from_settings(&config.switch);
    let lists = assembler.assemble_per_device(rows);

    let archiver = config
        .archive
        .enabled
        .then(|| Archiver::from_settings(&config.archive));
    let mut listener = match &archiver {
        Some(_) if config.archive.listen => Some(start_listener(config).await?),
        _ => None,
    };

    let mut report = RunReport::default();
    let mut result = Ok(());
    for (row, list) in rows.iter().zip(lists) {
        let host = config.switch.host_for(&row.switch);
        let outcome = match list {
            Ok(commands) => {
                deploy_row(row, &host, &commands, opener, credentials, archiver.as_ref()).await
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(rejected) => report.rows.push(RowOutcome {
                rejected,
                ..RowOutcome::ok(row.line, &host)
            }),
            Err(e) => {
                if let Err(e) = report.record_failure(policy, row.line, &host, e) {
                    result = Err(e);
                    break;
                }
            }
        }
    }

    if let Some(listener) = listener.take() {
        listener.shutdown().await;
    }
    result?;

    info!(
        "Switch rollout finished: {} of {} rows succeeded",
        report.succeeded(),
        rows.len()
    );
    Ok(report)
}

async fn start_listener(config: &RunConfig) -> Result<TftpHandle> {
    let mut handle =
        TftpServer::new(&config.archive.root, config.archive.listen_addr).spawn();
    handle.ready().await?;
    Ok(handle)
}

/// Returns the number of statements the device rejected.
async fn deploy_row<O: SessionOpener>(
    row: &SwitchRow,
    host: &str,
    commands: &CommandList,
    opener: &O,
    credentials: &Credentials,
    archiver: Option<&Archiver>,
) -> Result<usize> {
    if row.switch.trim().is_empty() {
        return Err(BuildError::InvalidAddress {
            value: host.to_string(),
        }
        .into());
    }

    info!("Row {}: configuring {} ({} statements)", row.line, host, commands.len());
    let mut session = opener.open(host, credentials).await?;
    let result = configure(&mut session, row, commands, credentials, archiver).await;
    if let Err(e) = session.close().await {
        warn!("{}: close failed: {}", host, e);
    }
    result
}

async fn configure<S: DeviceSession>(
    session: &mut S,
    row: &SwitchRow,
    commands: &CommandList,
    credentials: &Credentials,
    archiver: Option<&Archiver>,
) -> Result<usize> {
    session.elevate(&credentials.secret).await?;
    let report = session.apply(commands).await?;

    if let Some(archiver) = archiver {
        let filename = archiver.filename_for(&row.switch);
        archiver.archive(session, &filename).await?;
    }
    Ok(report.failures().count())
}
