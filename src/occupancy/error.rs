use ulid::Ulid;

use crate::model::Ms;

#[derive(Debug)]
pub enum SnapshotError {
    MalformedInterval { id: Ulid, start: Ms, end: Ms },
    DuplicateId(Ulid),
    LimitExceeded(&'static str),
    Parse(String),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::MalformedInterval { id, start, end } => {
                write!(f, "appointment {id} has malformed interval [{start}, {end})")
            }
            SnapshotError::DuplicateId(id) => write!(f, "duplicate id in snapshot: {id}"),
            SnapshotError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            SnapshotError::Parse(e) => write!(f, "snapshot parse error: {e}"),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<serde_json::Error> for SnapshotError {
    fn from(e: serde_json::Error) -> Self {
        SnapshotError::Parse(e.to_string())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum GridError {
    EmptyWindow,
    SlotTooShort(Ms),
    TooManySlots(usize),
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::EmptyWindow => write!(f, "slot grid window is empty"),
            GridError::SlotTooShort(ms) => write!(f, "slot of {ms}ms is below the minimum"),
            GridError::TooManySlots(n) => write!(f, "slot grid of {n} slots exceeds the maximum"),
        }
    }
}

impl std::error::Error for GridError {}
