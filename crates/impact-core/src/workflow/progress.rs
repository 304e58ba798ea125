//! Phase and project progress aggregation.

use super::model::{Deliverable, Project, Task};
use crate::catalog::PhaseId;
use crate::scores::round1;

pub const TASK_WEIGHT: f64 = 0.6;
pub const DELIVERABLE_WEIGHT: f64 = 0.4;

/// Weighted progress of a set of work items, in percent with one decimal.
///
/// When one side is empty the other carries the full weight. No items at
/// all means no progress.
pub fn phase_progress<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    deliverables: impl IntoIterator<Item = &'a Deliverable>,
) -> f64 {
    let (task_sum, task_count) = tasks
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), t| (sum + t.status.progress(), n + 1));
    let (deliv_sum, deliv_count) = deliverables
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), d| (sum + d.status.progress(), n + 1));

    let task_part = (task_count > 0).then(|| task_sum / task_count as f64);
    let deliv_part = (deliv_count > 0).then(|| deliv_sum / deliv_count as f64);

    let ratio = match (task_part, deliv_part) {
        (Some(t), Some(d)) => TASK_WEIGHT * t + DELIVERABLE_WEIGHT * d,
        (Some(t), None) => t,
        (None, Some(d)) => d,
        (None, None) => 0.0,
    };
    round1(ratio * 100.0)
}

/// Mean of the phase progress values, one decimal.
pub fn project_progress<'a>(values: impl IntoIterator<Item = &'a f64>) -> f64 {
    let (sum, n) = values.into_iter().fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        return 0.0;
    }
    round1(sum / n as f64)
}

impl Project {
    /// Work-item progress of `phase`.
    pub fn computed_phase_progress(&self, phase: PhaseId) -> f64 {
        phase_progress(self.tasks_in(phase), self.deliverables_in(phase))
    }

    /// Recompute `phase` from its work items into its completion percent,
    /// then refresh the project aggregates.
    pub fn recompute_phase(&mut self, phase: PhaseId) {
        let value = self.computed_phase_progress(phase);
        if let Some(instance) = self.phase_mut(phase) {
            instance.completion_percentage = value;
        }
        self.refresh_progress();
    }

    /// Sync `phase_progress` from phase completion percents and recompute
    /// the project mean.
    pub fn refresh_progress(&mut self) {
        self.phase_progress = self
            .phases
            .iter()
            .map(|p| (p.phase, p.completion_percentage))
            .collect();
        self.progress_percentage = project_progress(self.phase_progress.values());
    }
}
