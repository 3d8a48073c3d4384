use serde::{Deserialize, Serialize};

pub mod equivalence;

/// The outcome of a decision procedure. `True` and `False` carry a proof or a
/// counterexample, `Unknown` carries the reason the procedure gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverStatus<T = (), F = (), U = ()> {
    True(T),
    False(F),
    Unknown(U),
}

impl<T, F, U> SolverStatus<T, F, U> {
    pub fn is_success(&self) -> bool {
        matches!(self, SolverStatus::True(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, SolverStatus::False(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, SolverStatus::Unknown(_))
    }

    pub fn failure(&self) -> Option<&F> {
        match self {
            SolverStatus::False(f) => Some(f),
            _ => None,
        }
    }

    pub fn unknown(&self) -> Option<&U> {
        match self {
            SolverStatus::Unknown(u) => Some(u),
            _ => None,
        }
    }

    pub fn unwrap_failure(self) -> F {
        match self {
            SolverStatus::False(f) => f,
            _ => panic!("Called unwrap_failure on a non-failure SolverStatus"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverResult<T = (), F = (), U = (), Statistics = ()> {
    pub status: SolverStatus<T, F, U>,
    pub statistics: Statistics,
}

impl<T, F, U, Statistics> SolverResult<T, F, U, Statistics> {
    pub fn new(status: SolverStatus<T, F, U>, statistics: Statistics) -> Self {
        Self { status, statistics }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }

    pub fn is_unknown(&self) -> bool {
        self.status.is_unknown()
    }

    pub fn unwrap_failure(self) -> F {
        self.status.unwrap_failure()
    }
}

/// [SolverStatus] without payloads, for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SerializableSolverStatus {
    True,
    False,
    Unknown,
}

impl<T, F, U> From<&SolverStatus<T, F, U>> for SerializableSolverStatus {
    fn from(status: &SolverStatus<T, F, U>) -> Self {
        match status {
            SolverStatus::True(_) => SerializableSolverStatus::True,
            SolverStatus::False(_) => SerializableSolverStatus::False,
            SolverStatus::Unknown(_) => SerializableSolverStatus::Unknown,
        }
    }
}

#[test]
fn test_status_accessors() {
    let status: SolverStatus<(), Vec<char>, ()> = SolverStatus::False(vec!['a']);
    assert!(status.is_failure());
    assert_eq!(status.failure(), Some(&vec!['a']));
    assert!(status.unknown().is_none());
    assert_eq!(
        SerializableSolverStatus::from(&status),
        SerializableSolverStatus::False
    );
    assert_eq!(status.unwrap_failure(), vec!['a']);

    let status: SolverStatus<(), (), &str> = SolverStatus::Unknown("timeout");
    assert!(status.is_unknown());
    assert_eq!(status.unknown(), Some(&"timeout"));
    assert_eq!(
        SerializableSolverStatus::from(&status),
        SerializableSolverStatus::Unknown
    );
}
