//! Key-value persistence on top of an `embedded-storage` region.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod store;

pub use store::{FlashKvError, FlashKvStore, FlashRegion};
