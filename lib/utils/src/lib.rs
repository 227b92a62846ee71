//! Small helpers shared by the boot crates.
//!
//! Everything here is `no_std` (with `alloc`), so it can be used by the
//! config interpreter as well as by the host tooling.
#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub mod num;
pub mod strtol;
pub mod sysmem;
