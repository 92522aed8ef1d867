//! Runners: the switch rollout, the router file generator and the plug
//! provisioning loop, each wired from the components above.
//!
//! Every runner processes its rows in order. A row that fails is handed to
//! the [`FailurePolicy`]; file-level failures (input missing, output not
//! writable, TFTP listener down) end the run regardless.

mod plug;
mod router;
mod switch;

pub use plug::provision_plugs;
pub use router::{GeneratedConfig, generate_router_config};
pub use switch::deploy_switches;

use log::error;

use crate::error::{Error, ErrorKind};

/// What to do when a row fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure and go on with the next row.
    #[default]
    ContinueAll,
    /// Stop at the first failure.
    AbortAll,
    /// Stop only for these kinds, continue for the rest.
    AbortOn(Vec<ErrorKind>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Continue,
    Abort,
}

impl FailurePolicy {
    pub fn disposition(&self, error: &Error) -> Disposition {
        let abort = match self {
            FailurePolicy::ContinueAll => false,
            FailurePolicy::AbortAll => true,
            FailurePolicy::AbortOn(kinds) => kinds.contains(&error.kind()),
        };
        if abort {
            Disposition::Abort
        } else {
            Disposition::Continue
        }
    }
}

/// Result of one row.
#[derive(Debug)]
pub struct RowOutcome {
    /// Line of the row in the input file.
    pub line: u64,

    /// Device address or interface the row was about.
    pub target: String,

    /// Statements the device rejected while applying.
    pub rejected: usize,

    pub error: Option<Error>,
}

impl RowOutcome {
    pub fn ok(line: u64, target: impl Into<String>) -> Self {
        Self {
            line,
            target: target.into(),
            rejected: 0,
            error: None,
        }
    }

    pub fn failed(line: u64, target: impl Into<String>, error: Error) -> Self {
        Self {
            line,
            target: target.into(),
            rejected: 0,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-row results of a whole run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub rows: Vec<RowOutcome>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.rows.iter().filter(|r| r.is_ok()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &RowOutcome> {
        self.rows.iter().filter(|r| !r.is_ok())
    }

    /// Record a row failure and apply `policy`. Returns the error back
    /// when the run has to stop.
    fn record_failure(
        &mut self,
        policy: &FailurePolicy,
        line: u64,
        target: &str,
        error: Error,
    ) -> Result<(), Error> {
        error!("Row {} ({}): {}", line, target, error);
        match policy.disposition(&error) {
            Disposition::Abort => Err(error),
            Disposition::Continue => {
                self.rows.push(RowOutcome::failed(line, target, error));
                Ok(())
            }
        }
    }
}
