//! Shared utility code throughout the w3obj project.

#![deny(rust_2018_idioms, rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod binary;

mod cursor;
pub use cursor::*;
