//! Stand-ins for the `mysql`/`sqlite` connection kinds accepted in
//! configuration but not implemented (spec §6: "rejected at startup with a
//! clear 'not implemented' diagnostic").

use std::fmt;

/// The backing-store connection kind named in configuration (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    InMemory,
    MySql,
    Sqlite,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InMemory => write!(f, "in-memory"),
            Self::MySql => write!(f, "mysql"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl BackendKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "in-memory" | "memory" => Some(Self::InMemory),
            "mysql" => Some(Self::MySql),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// `Err` with a diagnostic message for connection kinds accepted as
    /// configuration values but with no implemented engine.
    pub fn check_implemented(self) -> Result<(), String> {
        match self {
            Self::InMemory => Ok(()),
            Self::MySql | Self::Sqlite => Err(format!(
                "backing store '{self}' is accepted as configuration but not implemented"
            )),
        }
    }
}
