// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod apply;
mod bulk;
mod command;
mod error;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::{apply, create_item};
pub use bulk::{BulkAssignOutcome, BulkFailure, apply_bulk_assign};
pub use command::{Command, NewItem};
pub use error::CoreError;
pub use state::{
    AssigneeEligibility, BookingCheck, SideEffect, TransitionContext, TransitionResult,
    TransitionWarning,
};
