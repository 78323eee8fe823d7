use std::{fmt, os::unix::process::ExitStatusExt, process::ExitStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageStatus(ExitStatus);

impl From<ExitStatus> for StageStatus {
    fn from(value: ExitStatus) -> Self {
        Self(value)
    }
}

impl StageStatus {
    pub fn code(&self) -> Option<i32> {
        self.0.code()
    }

    pub fn signal(&self) -> Option<i32> {
        self.0.signal()
    }

    pub fn success(&self) -> bool {
        self.0.success()
    }

    pub fn failure(&self) -> bool {
        !self.success()
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code(), self.signal()) {
            (Some(code), _) => write!(f, "status {code}"),
            (None, Some(signal)) => write!(f, "signal {signal}"),
            (None, None) => write!(f, "unknown status"),
        }
    }
}
