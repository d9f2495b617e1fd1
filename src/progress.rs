//! Derives checkpoint status and project progress from task state.
//!
//! Everything in this module is pure and synchronous. Callers pass
//! their own [`Project`] value, so it can be invoked from any number
//! of request handlers at once without coordination.
use crate::schema::{Checkpoint, CheckpointStatus, Project};

/// Task counts accumulated over a checkpoint tree.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub total: usize,
    pub completed: usize,
}

impl Tally {
    #[must_use]
    pub fn of(checkpoint: &Checkpoint) -> Self {
        Self {
            total: checkpoint.tasks.len(),
            completed: checkpoint.tasks.iter().filter(|t| t.is_completed()).count(),
        }
    }

    /// Rounded percentage of completed tasks.
    ///
    /// Halves are rounded up (12.5 becomes 13) and the division is done
    /// in integers so the result never depends on float precision.
    /// It is `0` if there are no tasks at all.
    #[must_use]
    pub fn percentage(self) -> u8 {
        if self.total == 0 {
            return 0;
        }

        let completed = self.completed.min(self.total) as u128;
        let total = self.total as u128;
        let rounded = (200 * completed + total) / (2 * total);

        // completed <= total so this never exceeds 100
        u8::try_from(rounded).unwrap_or(100)
    }
}

impl std::ops::AddAssign for Tally {
    fn add_assign(&mut self, rhs: Self) {
        self.total += rhs.total;
        self.completed += rhs.completed;
    }
}

/// Derives the status of a single checkpoint from its tasks.
///
/// A checkpoint without tasks keeps whatever status it already had.
pub fn derive_checkpoint(checkpoint: &mut Checkpoint) -> Tally {
    let tally = Tally::of(checkpoint);
    if tally.total > 0 {
        checkpoint.status = if tally.completed == tally.total {
            CheckpointStatus::Completed
        } else {
            CheckpointStatus::Pending
        };
    }
    tally
}

/// Recomputes every checkpoint status and the overall progress of
/// `project` in place, returning the task counts it used.
///
/// Checkpoints are visited in their stored order and never re-sorted.
pub fn recompute_in_place(project: &mut Project) -> Tally {
    let mut tally = Tally::default();
    for checkpoint in &mut project.checkpoints {
        tally += derive_checkpoint(checkpoint);
    }
    project.progress = tally.percentage();
    tally
}

/// Owned variant of [`recompute_in_place`].
#[must_use]
pub fn recompute(mut project: Project) -> Project {
    recompute_in_place(&mut project);
    project
}
