//! Data link control on attach/detach

use qmi_nas::AttachObserver;
use std::io;
use std::process::Command;
use tracing::{error, info};

/// Brings `interface` up when the modem attaches and down when it detaches
#[derive(Debug, Clone)]
pub struct LinkControl {
    interface: String,
}

impl LinkControl {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
        }
    }

    pub fn set_link(&self, up: bool) -> io::Result<()> {
        let status = link_command(&self.interface, up).status()?;
        if !status.success() {
            return Err(io::Error::other(format!(
                "ip link set {} failed: {status}",
                self.interface
            )));
        }
        Ok(())
    }
}

impl AttachObserver for LinkControl {
    fn attach_changed(&mut self, has_service: bool) {
        info!(interface = %self.interface, has_service, "Attach state changed");
        if let Err(e) = self.set_link(has_service) {
            error!(interface = %self.interface, error = %e, "Could not change link state");
        }
    }
}

pub fn link_command(interface: &str, up: bool) -> Command {
    let mut command = Command::new("ip");
    command.args(["link", "set", "dev", interface, if up { "up" } else { "down" }]);
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn test_link_command_args() {
        let up = link_command("wwan0", true);
        assert_eq!(up.get_program(), OsStr::new("ip"));
        assert_eq!(
            up.get_args().collect::<Vec<_>>(),
            ["link", "set", "dev", "wwan0", "up"].map(OsStr::new)
        );

        let down = link_command("wwan1", false);
        assert_eq!(down.get_args().last(), Some(OsStr::new("down")));
    }
}
