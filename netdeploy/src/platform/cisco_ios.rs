//! Cisco IOS platform definition.
//!
//! ```text
//! Switch>                  # exec
//! Switch#                  # privileged
//! Switch(config)#          # configuration
//! Switch(config-if)#       # configuration sub-mode
//! ```
//!
//! ```text
//! ┌──────┐  enable     ┌────────────┐  configure terminal  ┌───────────────┐
//! │ exec ├─────────────► privileged ├──────────────────────► configuration │
//! │  >   │   disable   │     #      │        end           │  (config*)#   │
//! └──────┘◄────────────┴────────────┘◄─────────────────────┴───────────────┘
//! ```

use super::definition::PlatformDefinition;
use super::privilege_level::{Mode, PrivilegeLevel};
use crate::error::ChannelError;

pub const PLATFORM_NAME: &str = "cisco_ios";

/// Answer to `enable` on a device with an enable secret.
pub const PASSWORD_PROMPT: &str = r"(?mi)^password:\s?$";

/// Create the Cisco IOS platform definition.
pub fn platform() -> Result<PlatformDefinition, ChannelError> {
    let exec = PrivilegeLevel::new(Mode::Exec, r"(?mi)^[\w.\-@()/: ]{1,63}>\s?$")?;

    let privileged = PrivilegeLevel::new(Mode::Privileged, r"(?mi)^[\w.\-@()/: ]{1,63}#\s?$")?
        .with_escalate("enable")
        .with_deescalate("disable")
        .with_auth(PASSWORD_PROMPT)?
        .with_not_contains("(config");

    let configuration = PrivilegeLevel::new(
        Mode::Configuration,
        r"(?mi)^[\w.\-@()/: ]{1,63}\(config[\w.\-@/:+]{0,63}\)#\s?$",
    )?
    .with_escalate("configure terminal")
    .with_deescalate("end");

    Ok(
        PlatformDefinition::new(PLATFORM_NAME, [exec, privileged, configuration])?
            .with_failure_pattern("% Invalid input")
            .with_failure_pattern("% Incomplete command")
            .with_failure_pattern("% Ambiguous command")
            .with_failure_pattern("% Error")
            .with_on_open_command("terminal length 0"),
    )
}
