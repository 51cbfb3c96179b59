//! # Cadence Core Library
//!
//! A recurrence and date-resolution engine for calendar-anchored recurring
//! tasks: civil-date arithmetic, timezone-safe comparisons, closed-form
//! recurrence-rule evaluation, and occurrence resolution against per-task
//! skip/completion exception lists.
//!
//! ## Features
//!
//! - **Civil-Date Model**: calendar dates independent of timezone, with
//!   UTC-anchored serialization so a date never shifts a day in storage
//! - **Time-Aware Comparisons**: bare dates span their whole day when
//!   compared against timed values, so date-bounded filters behave the same
//!   in every host timezone
//! - **Closed-Form Recurrence**: daily/weekly/monthly/yearly grids with
//!   arbitrary intervals resolved arithmetically, never by stepping one unit
//!   at a time
//! - **Exception-Aware Resolution**: per-occurrence skip and completion
//!   records, offset-preserving anchor advancement, and exact-key revert
//! - **Pure Computation**: every operation takes a task snapshot and returns
//!   a new one; the host clock is read in exactly one place
//!
//! ## Core Modules
//!
//! - [`civil`]: `CivilDate`/`CivilDateTime` and the single `today()` read
//! - [`compare`]: timezone-safe date/date-time comparison utilities
//! - [`recurrence`]: recurrence-rule descriptor parsing and grid evaluation
//! - [`resolver`]: effective status and next-occurrence resolution
//! - [`exceptions`]: skip/complete instance-list management
//! - [`models`]: task state, status, and storage-facing DTOs
//! - [`error`]: error types
//!
//! ## Example Usage
//!
//! ```rust
//! use cadence_core::civil::CivilDate;
//! use cadence_core::models::TaskRecurrenceState;
//! use cadence_core::recurrence::RecurrenceRule;
//! use cadence_core::resolver::OccurrenceResolver;
//!
//! fn main() -> Result<(), cadence_core::error::CoreError> {
//!     let rule = RecurrenceRule::parse("DTSTART:20260208;FREQ=DAILY;INTERVAL=1")?;
//!     let task = TaskRecurrenceState {
//!         recurrence: Some(rule),
//!         ..Default::default()
//!     };
//!
//!     let resolver = OccurrenceResolver::at(CivilDate::new(2026, 2, 8)?);
//!     let next = resolver.next_uncompleted_occurrence(&task);
//!     assert_eq!(next, Some(CivilDate::new(2026, 2, 8)?));
//!     Ok(())
//! }
//! ```

pub mod civil;
pub mod compare;
pub mod error;
pub mod exceptions;
pub mod models;
pub mod recurrence;
pub mod resolver;
