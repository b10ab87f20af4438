use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Outcome description of some process: what happened and whether it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub description: String,
    pub is_error: bool,
}

impl Status {
    pub fn new(description: impl Into<String>, is_error: bool) -> Self {
        Self {
            description: description.into(),
            is_error,
        }
    }

    pub fn success() -> Self {
        Self::new("Success", false)
    }

    pub fn failure(reason: &str) -> Self {
        Self::new(format!("Failure: {reason}"), true)
    }
}

/// Consistent point-in-time view of a [`ProgressStatus`].
///
/// All fields are captured under the same lock, so a snapshot never mixes
/// state from two different updates (e.g. percent 100 with `is_done` false).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub status: Status,
    pub is_done: bool,
    pub percent: u8,
}

impl ProgressSnapshot {
    pub fn description(&self) -> &str {
        &self.status.description
    }

    pub fn is_error(&self) -> bool {
        self.status.is_error
    }
}

#[derive(Debug)]
struct StatusRecord {
    description: String,
    is_error: bool,
    is_done: bool,
    percent: u8,
}

/// Thread-safe completion state of one running command.
///
/// Single writer (the worker executing the command, through its listener),
/// any number of readers. The whole record lives behind one mutex; composite
/// updates are applied atomically and reads go through [`snapshot`].
///
/// Once terminal (`is_done`), every mutation is a no-op. The success and
/// error paths are guarded symmetrically.
///
/// [`snapshot`]: ProgressStatus::snapshot
#[derive(Debug)]
pub struct ProgressStatus {
    record: Mutex<StatusRecord>,
}

impl ProgressStatus {
    pub fn new() -> Self {
        Self {
            record: Mutex::new(StatusRecord {
                description: "Starting".to_string(),
                is_error: false,
                is_done: false,
                percent: 0,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StatusRecord> {
        match self.record.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let record = self.lock();
        ProgressSnapshot {
            status: Status::new(record.description.clone(), record.is_error),
            is_done: record.is_done,
            percent: record.percent,
        }
    }

    pub fn is_done(&self) -> bool {
        self.lock().is_done
    }

    pub fn is_error(&self) -> bool {
        self.lock().is_error
    }

    pub fn percent(&self) -> u8 {
        self.lock().percent
    }

    pub fn description(&self) -> String {
        self.lock().description.clone()
    }

    /// Atomically updates percent and description. No-op once terminal.
    pub fn set_percent(&self, percent: u8, description: &str) {
        let mut record = self.lock();
        if !record.is_done {
            record.percent = percent;
            record.description = description.to_string();
        }
    }

    /// Marks the process successfully completed, forcing percent to 100.
    /// No-op once terminal.
    pub fn set_done(&self, description: &str) {
        let mut record = self.lock();
        if !record.is_done {
            record.description = description.to_string();
            record.is_done = true;
            record.percent = 100;
        }
    }

    /// Marks the process terminated with an error. No-op once terminal.
    pub fn set_error(&self, description: &str) {
        let mut record = self.lock();
        if !record.is_done {
            record.description = description.to_string();
            record.is_done = true;
            record.is_error = true;
        }
    }
}

impl Default for ProgressStatus {
    fn default() -> Self {
        Self::new()
    }
}
