//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides a clinic-themed interface for:
//! - Symptom intake with keyboard-only entry
//! - Assessment result with probabilities and advice

mod app;
mod styles;
mod ui;

pub use app::{App, Screen};
pub use styles::ClinicTheme;
pub use ui::ServiceStatus;
