//! Signal-0 process probe.

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;

use crate::application::ports::ProcessProbe;
use crate::domain::status::ProbeResult;

/// Probes pids with `kill(pid, 0)`.
pub struct SignalProbe;

impl ProcessProbe for SignalProbe {
    fn probe(&self, pid: i32) -> ProbeResult {
        // pid 0 and negative pids address process groups.
        if pid <= 0 {
            return ProbeResult::Failed(format!("invalid pid {pid}"));
        }
        match kill(Pid::from_raw(pid), None) {
            Ok(()) => ProbeResult::Alive,
            Err(Errno::ESRCH) => ProbeResult::NoSuchProcess,
            Err(Errno::EPERM) => ProbeResult::PermissionDenied,
            Err(e) => ProbeResult::Failed(e.to_string()),
        }
    }
}
