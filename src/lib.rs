//! Smartwatch text reader: wires the paging engine to resources, persistence,
//! the companion channel, buttons and the display.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod app;
mod settings_sync;

pub use app::ReaderApp;
pub use settings_sync::DocumentOrigin;
