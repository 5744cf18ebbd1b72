//! Tracking checklist for lab orders and the status derived from it.

use serde::{Deserialize, Serialize};

use crate::record::OrderStatus;
use crate::ClinicError;

/// One named milestone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Checkpoint {
    pub name: String,
    pub done: bool,
}

impl Checkpoint {
    fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
        }
    }
}

/// Ordered non-terminal checkpoints plus one terminal checkpoint.
///
/// Transitions go through [`Checklist::set`], which returns a new snapshot
/// and keeps the terminal flag consistent with its prerequisites.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Checklist {
    steps: Vec<Checkpoint>,
    terminal: Checkpoint,
}

impl Checklist {
    /// All checkpoints unset. Repeated names and a step named like the
    /// terminal are dropped, so every step stays reachable by [`Checklist::set`].
    pub fn new<'a>(steps: impl IntoIterator<Item = &'a str>, terminal: &str) -> Self {
        let mut checklist = Self {
            steps: Vec::new(),
            terminal: Checkpoint::pending(terminal),
        };
        for name in steps {
            if name != terminal {
                checklist.merge_step(name.to_string(), false);
            }
        }
        checklist
    }

    /// Build from a name -> flag mapping as stored by the backend.
    ///
    /// The entry named `terminal` becomes the terminal checkpoint; it is unset
    /// when absent. A repeated name keeps its first position and counts as done
    /// if any occurrence is. Flags are taken as-is, without applying transition
    /// rules.
    pub fn from_flags<S: Into<String>>(
        flags: impl IntoIterator<Item = (S, bool)>,
        terminal: &str,
    ) -> Self {
        let mut checklist = Self {
            steps: Vec::new(),
            terminal: Checkpoint::pending(terminal),
        };
        for (name, done) in flags {
            let name = name.into();
            if name == terminal {
                checklist.terminal.done |= done;
            } else {
                checklist.merge_step(name, done);
            }
        }
        checklist
    }

    fn merge_step(&mut self, name: String, done: bool) {
        match self.steps.iter_mut().find(|step| step.name == name) {
            Some(existing) => existing.done |= done,
            None => self.steps.push(Checkpoint { name, done }),
        }
    }

    pub fn steps(&self) -> &[Checkpoint] {
        &self.steps
    }

    pub fn terminal(&self) -> &Checkpoint {
        &self.terminal
    }

    /// Non-terminal checkpoints still unset.
    pub fn remaining(&self) -> usize {
        self.steps.iter().filter(|step| !step.done).count()
    }

    /// Completed non-terminal checkpoints out of the total.
    pub fn progress(&self) -> (usize, usize) {
        (self.steps.len() - self.remaining(), self.steps.len())
    }

    /// Apply a toggle and return the resulting snapshot.
    ///
    /// - clearing any step clears the terminal checkpoint;
    /// - setting the last unfinished step sets the terminal checkpoint;
    /// - the terminal checkpoint can be cleared freely, but only set once
    ///   every step is done.
    pub fn set(&self, name: &str, done: bool) -> Result<Checklist, ClinicError> {
        let mut next = self.clone();

        if name == next.terminal.name {
            let remaining = next.remaining();
            if done && remaining > 0 {
                return Err(ClinicError::PrerequisitesIncomplete {
                    terminal: next.terminal.name.clone(),
                    remaining,
                });
            }
            next.terminal.done = done;
            return Ok(next);
        }

        let step = next
            .steps
            .iter_mut()
            .find(|step| step.name == name)
            .ok_or_else(|| ClinicError::UnknownCheckpoint(name.to_string()))?;
        let was_done = step.done;
        step.done = done;

        if !done {
            next.terminal.done = false;
        } else if !was_done && next.remaining() == 0 {
            next.terminal.done = true;
        }

        Ok(next)
    }
}

/// Status implied by a checklist: terminal set wins, then any step set.
pub fn derive_status(checklist: &Checklist) -> OrderStatus {
    if checklist.terminal.done {
        OrderStatus::Completed
    } else if checklist.steps.iter().any(|step| step.done) {
        OrderStatus::InProgress
    } else {
        OrderStatus::Pending
    }
}
