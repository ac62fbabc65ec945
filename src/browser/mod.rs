//! Browser session management
//!
//! Launching or connecting to Chrome/Chromium, reading the source tab through
//! [`TabSource`], and the [`crate::storybook::OutputSurface`] a session provides:
//! output documents in new tabs, alerts and PDF printing.

pub mod config;
pub mod session;
pub mod source;

pub use config::{ConnectionOptions, DEFAULT_IDLE_TIMEOUT, LaunchOptions};
pub use session::{BrowserSession, PdfOptions};
pub use source::{NodeHandle, TabSource};
