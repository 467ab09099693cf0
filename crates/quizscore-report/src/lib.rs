//! quizscore-report: Attempt records and review pages.
//!
//! An [`AttemptRecord`] is the shape a scored attempt takes on its way to
//! storage; the HTML generator renders one for human review.

pub mod attempt;
pub mod html;

pub use attempt::{AttemptRecord, EndReason};
pub use html::{generate_html, write_html_report};
