//! Exception list management: skip/complete instance sets and their revert
//! operations.
//!
//! Every operation is snapshot-in/snapshot-out. The manager mutates only the
//! returned copy and re-derives the scheduled/due anchors through the
//! resolver, so callers decide how to persist and how to notify observers.
//!
//! Revert operations take the *originally recorded* date key, not whatever
//! the task's current scheduled date happens to be; use
//! [`ExceptionListManager::find_skipped_dates_before`] to discover which
//! key produced the current state.

use crate::civil::CivilDate;
use crate::models::TaskRecurrenceState;
use crate::resolver::OccurrenceResolver;

pub struct ExceptionListManager {
    resolver: OccurrenceResolver,
}

impl ExceptionListManager {
    /// A manager resolving against the host's current local date.
    pub fn new() -> Self {
        Self {
            resolver: OccurrenceResolver::new(),
        }
    }

    /// A manager pinned to an explicit "today" (deterministic; tests and
    /// batch jobs).
    pub fn at(today: CivilDate) -> Self {
        Self {
            resolver: OccurrenceResolver::at(today),
        }
    }

    pub fn resolver(&self) -> &OccurrenceResolver {
        &self.resolver
    }

    /// Records `date` as skipped and advances the anchors past it.
    ///
    /// The skipped key stays in `skipped_instances` permanently (until
    /// explicitly reverted) even once it is no longer the current
    /// occurrence. Skipping an already-skipped date is a no-op.
    pub fn skip_occurrence(&self, task: &TaskRecurrenceState, date: CivilDate) -> TaskRecurrenceState {
        if task.skipped_instances.contains(&date) {
            return task.clone();
        }
        let mut next = task.clone();
        next.skipped_instances.insert(date);
        let anchors = self
            .resolver
            .anchors_for(&next, true, Some(date.add_days(1)), true);
        next.with_anchors(anchors)
    }

    /// Removes exactly `date` from `skipped_instances` and re-derives the
    /// anchors from the rule grid.
    ///
    /// The search deliberately ignores the current scheduled date so the
    /// anchors return to where they stood before the skip:
    /// `unskip(skip(task, d), d)` restores the original scheduled/due pair.
    /// Unskipping a date that was never skipped is a no-op.
    pub fn unskip_occurrence(
        &self,
        task: &TaskRecurrenceState,
        date: CivilDate,
    ) -> TaskRecurrenceState {
        if !task.skipped_instances.contains(&date) {
            return task.clone();
        }
        let mut next = task.clone();
        next.skipped_instances.remove(&date);
        // Search from the removed key, not the current scheduled date: the
        // reverted occurrence is open again and becomes current.
        let anchors = self.resolver.anchors_for(&next, false, Some(date), true);
        next.with_anchors(anchors)
    }

    /// Records `date` as completed and advances the anchors to the next
    /// open occurrence. Idempotent.
    pub fn mark_complete(&self, task: &TaskRecurrenceState, date: CivilDate) -> TaskRecurrenceState {
        if task.complete_instances.contains(&date) {
            return task.clone();
        }
        let mut next = task.clone();
        next.complete_instances.insert(date);
        let anchors = self
            .resolver
            .anchors_for(&next, true, Some(date.add_days(1)), true);
        next.with_anchors(anchors)
    }

    /// Removes exactly `date` from `complete_instances` and re-derives the
    /// anchors from the rule grid (same revert contract as
    /// [`Self::unskip_occurrence`]). Idempotent.
    pub fn mark_incomplete(
        &self,
        task: &TaskRecurrenceState,
        date: CivilDate,
    ) -> TaskRecurrenceState {
        if !task.complete_instances.contains(&date) {
            return task.clone();
        }
        let mut next = task.clone();
        next.complete_instances.remove(&date);
        let anchors = self.resolver.anchors_for(&next, false, Some(date), true);
        next.with_anchors(anchors)
    }

    /// All skipped keys strictly before `date`, ascending.
    ///
    /// UI layers call this before offering an "unskip" action so they can
    /// pass the correct key back; the last element is the nearest-before
    /// exception.
    pub fn find_skipped_dates_before(
        &self,
        task: &TaskRecurrenceState,
        date: CivilDate,
    ) -> Vec<CivilDate> {
        task.skipped_instances.range(..date).copied().collect()
    }
}

impl Default for ExceptionListManager {
    fn default() -> Self {
        Self::new()
    }
}
