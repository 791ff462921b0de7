//! Runtime info parsing and liveness classification: pure, no I/O.

use procserv_common::InstanceState;

/// Contents of procServ's `--info-file`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeInfo {
    pub pid: Option<i32>,
    /// `tcp:` and `unix:` entries, in file order, without their prefix.
    pub endpoints: Vec<String>,
}

impl RuntimeInfo {
    /// Parse `pid:`, `tcp:` and `unix:` lines; anything else is ignored.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut info = Self::default();
        for line in text.lines().map(str::trim) {
            if let Some(pid) = line.strip_prefix("pid:") {
                info.pid = pid.trim().parse().ok().filter(|p: &i32| *p > 0);
            } else if let Some(addr) = line.strip_prefix("tcp:") {
                info.endpoints.push(addr.to_string());
            } else if let Some(path) = line.strip_prefix("unix:") {
                info.endpoints.push(path.to_string());
            }
        }
        info
    }
}

/// Outcome of probing a pid with signal 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Alive,
    /// `ESRCH`
    NoSuchProcess,
    /// `EPERM`: the process exists but belongs to someone else.
    PermissionDenied,
    Failed(String),
}

/// Classify from an optional info file and a probe of its pid.
///
/// Only `NoSuchProcess` proves an instance dead; every other probe outcome
/// leaves it `Running`.
#[must_use]
pub fn classify(info: Option<&RuntimeInfo>, probe: impl FnOnce(i32) -> ProbeResult) -> InstanceState {
    let Some(pid) = info.and_then(|i| i.pid) else {
        return InstanceState::Stopped;
    };
    match probe(pid) {
        ProbeResult::NoSuchProcess => InstanceState::Dead,
        ProbeResult::Alive | ProbeResult::PermissionDenied | ProbeResult::Failed(_) => {
            InstanceState::Running
        }
    }
}
