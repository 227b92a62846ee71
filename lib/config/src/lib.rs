//! Build-time limits of the config interpreter.
//!
//! The values live in `flags.json` at the workspace root and are turned into
//! constants by the build script, so a board port can change them without
//! touching the parser.

#![no_std]
#![deny(missing_docs)]

include!(concat!(env!("OUT_DIR"), "/build_flags.rs"));
