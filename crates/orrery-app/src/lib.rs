//! Orrery application shell.
//!
//! Owns the window and drives the solar system through its surface lifecycle.

pub mod window;
