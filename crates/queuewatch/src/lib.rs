//! queuewatch - terminal dashboard for a media job queue.
//!
//! Polls the queue API for aggregate stats and the most recent jobs and
//! keeps a dashboard page up to date.

mod app;
pub mod logging;

pub use app::{Dashboard, DashboardBuilder};

#[doc(hidden)]
pub use queuewatch_core;
#[doc(hidden)]
pub use queuewatch_runtime;
