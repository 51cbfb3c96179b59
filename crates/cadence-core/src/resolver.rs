//! Occurrence resolution: ties the rule evaluator to a task's exception
//! sets.
//!
//! The resolver captures "today" exactly once, at construction. Every other
//! input is an explicit argument, which keeps the operations pure and
//! directly testable with a pinned date.

use crate::civil::{today, CivilDate};
use crate::models::{AnchorDates, RecurrenceAnchorMode, TaskRecurrenceState, TaskStatus};
use crate::recurrence::RecurrenceRule;

/// Resolves effective status and next-occurrence questions for a task
/// snapshot against a fixed current date.
#[derive(Debug, Clone, Copy)]
pub struct OccurrenceResolver {
    today: CivilDate,
}

impl OccurrenceResolver {
    /// A resolver pinned to the host's current local calendar date.
    pub fn new() -> Self {
        Self { today: today() }
    }

    /// A resolver pinned to an explicit date. This is the deterministic
    /// entry point for tests and for batch jobs that must see one
    /// consistent "today" across many tasks.
    pub fn at(today: CivilDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> CivilDate {
        self.today
    }

    /// The status a task effectively has on `date`.
    ///
    /// Non-recurring tasks report their own status untouched. A recurring
    /// task reports `Done` when `date` is a recorded completion; otherwise
    /// its own status is passed through verbatim, so a custom status such as
    /// "in-progress" survives resolution of an open occurrence.
    pub fn effective_status(&self, task: &TaskRecurrenceState, date: CivilDate) -> TaskStatus {
        if task.recurrence.is_none() {
            return task.status.clone();
        }
        if task.complete_instances.contains(&date) {
            return TaskStatus::Done;
        }
        task.status.clone()
    }

    /// The first occurrence that is neither completed nor skipped, or `None`
    /// when the task has no recurrence rule.
    ///
    /// Scheduled mode searches from the latest of the rule anchor, the
    /// task's current scheduled date, and today, so a current unresolved
    /// task resolves to its own scheduled date and a task last touched years
    /// ago resolves to the first occurrence on or after today. Completion
    /// mode re-anchors the grid at the most recent completion and searches
    /// from one full interval past it.
    pub fn next_uncompleted_occurrence(&self, task: &TaskRecurrenceState) -> Option<CivilDate> {
        let (rule, reference) = self.search_frame(task, true)?;
        Some(first_open(task, &rule, reference))
    }

    /// Computes the next uncompleted occurrence and shifts the task's anchor
    /// dates to it.
    ///
    /// `scheduled` moves by a whole-day delta that lands its date on the
    /// occurrence; with `preserve_offset`, `due` moves by the same delta so
    /// the gap between the two stays exact, including gaps larger than the
    /// recurrence interval. Idempotent: an already-current unresolved task
    /// comes back unchanged.
    pub fn advance_to_next(
        &self,
        task: &TaskRecurrenceState,
        preserve_offset: bool,
    ) -> AnchorDates {
        self.anchors_for(task, true, None, preserve_offset)
    }

    /// Shared advancement used by the public API and the exception manager.
    ///
    /// `use_scheduled_floor` keeps the search from moving backward past the
    /// task's current scheduled date; revert operations disable it so prior
    /// anchors can be restored. `extra_floor` starts the search after a
    /// specific date (skip/complete semantics).
    pub(crate) fn anchors_for(
        &self,
        task: &TaskRecurrenceState,
        use_scheduled_floor: bool,
        extra_floor: Option<CivilDate>,
        preserve_offset: bool,
    ) -> AnchorDates {
        let current = AnchorDates {
            scheduled: task.scheduled,
            due: task.due,
        };
        let Some((rule, mut reference)) = self.search_frame(task, use_scheduled_floor) else {
            return current;
        };
        if let Some(floor) = extra_floor {
            reference = reference.max(floor);
        }
        let next = first_open(task, &rule, reference);
        shift_anchors(task, next, preserve_offset)
    }

    /// The rule to evaluate and the date to start searching from, per the
    /// task's anchor mode. `None` when the task is non-recurring.
    fn search_frame(
        &self,
        task: &TaskRecurrenceState,
        use_scheduled_floor: bool,
    ) -> Option<(RecurrenceRule, CivilDate)> {
        let rule = task.recurrence.as_ref()?;
        match task.anchor_mode {
            RecurrenceAnchorMode::Scheduled => {
                let mut reference = rule.anchor().max(self.today);
                if use_scheduled_floor {
                    if let Some(scheduled) = task.scheduled {
                        reference = reference.max(scheduled.date());
                    }
                }
                Some((rule.clone(), reference))
            }
            RecurrenceAnchorMode::Completion => {
                // The grid floats from the last completion (the anchor when
                // nothing is completed yet), one full interval forward.
                let base = task.last_completion().unwrap_or(rule.anchor());
                let rule = rule.re_anchored(base);
                let reference = self.today.max(rule.advance_intervals(base, 1));
                Some((rule, reference))
            }
        }
    }
}

impl Default for OccurrenceResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Walks the rule grid occurrence-by-occurrence from `reference`, skipping
/// dates recorded as completed or skipped, and returns the first open one.
fn first_open(task: &TaskRecurrenceState, rule: &RecurrenceRule, reference: CivilDate) -> CivilDate {
    let mut reference = reference;
    loop {
        let occurrence = rule.occurrence_on_or_after(reference);
        if !task.complete_instances.contains(&occurrence)
            && !task.skipped_instances.contains(&occurrence)
        {
            return occurrence;
        }
        reference = occurrence.add_days(1);
    }
}

/// Shifts whichever anchor dates the task carries so the primary anchor's
/// date lands on `next`, preserving time-of-day components.
fn shift_anchors(task: &TaskRecurrenceState, next: CivilDate, preserve_offset: bool) -> AnchorDates {
    match (task.scheduled, task.due) {
        (Some(scheduled), due) => {
            let delta = next.days_since(&scheduled.date());
            AnchorDates {
                scheduled: Some(scheduled.shift_days(delta)),
                due: match due {
                    Some(d) if preserve_offset => Some(d.shift_days(delta)),
                    other => other,
                },
            }
        }
        (None, Some(due)) => {
            let delta = next.days_since(&due.date());
            AnchorDates {
                scheduled: None,
                due: Some(due.shift_days(delta)),
            }
        }
        (None, None) => AnchorDates {
            scheduled: Some(next.into()),
            due: None,
        },
    }
}
