//! RCSA - risk and control self-assessment wizard
//!
//! Library half of the `rcsa` binary: the assessment model, its persistence,
//! the seven-step wizard controller and the formatting and notification
//! helpers the terminal front end draws with.

pub mod assessment;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod format;
pub mod notifications;
pub mod store;
pub mod wizard;
