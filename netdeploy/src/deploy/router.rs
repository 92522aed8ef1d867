//! Router configuration file generator.

use log::info;

use super::{FailurePolicy, RowOutcome, RunReport};
use crate::assemble::RouterAssembler;
use crate::builder::CommandList;
use crate::config::RouterSettings;
use crate::error::Result;
use crate::source::RouterRow;

/// The generated file contents and what happened to each row.
#[derive(Debug)]
pub struct GeneratedConfig {
    pub commands: CommandList,
    pub report: RunReport,
}

/// Read the router table, assemble it and write the output file.
///
/// Rows that fail to build are left out of the file when `policy` lets the
/// run continue. The NAT trailer is always appended.
pub fn generate_router_config(
    settings: &RouterSettings,
    policy: &FailurePolicy,
) -> Result<GeneratedConfig> {
    let rows = RouterRow::read(&settings.input, settings.delimiter_byte()?)?;
    let assembler = RouterAssembler::from_settings(settings);

    let mut commands = CommandList::new();
    let mut report = RunReport::default();
    for row in &rows {
        let target = if row.interface.trim().is_empty() {
            format!("vlan {}", row.vlan.trim())
        } else {
            row.interface.trim().to_string()
        };
        match assembler.assemble_row(row) {
            Ok(block) => {
                commands.extend(block);
                report.rows.push(RowOutcome::ok(row.line, target));
            }
            Err(e) => report.record_failure(policy, row.line, &target, e)?,
        }
    }
    commands.extend(assembler.trailer().commands());

    commands.write_to(&settings.output)?;
    info!(
        "Cisco configuration written to {} ({} statements from {} rows)",
        settings.output.display(),
        commands.len(),
        report.succeeded()
    );
    Ok(GeneratedConfig { commands, report })
}
