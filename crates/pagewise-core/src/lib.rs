//! Hardware-independent paging engine for a wrist-sized text reader.
//!
//! The crate owns the text buffer, splits it into budget-sized pages, reassembles
//! documents delivered in fragments, and defines the traits the application layer
//! uses to reach resources, persistence, input and the display.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod assembler;
pub mod catalog;
pub mod document;
pub mod engine;
pub mod error;
pub mod input;
pub mod paginator;
pub mod render;
pub mod settings;
mod text_utils;

pub use error::ReaderError;
