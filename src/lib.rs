//! Reddit main-branch extractor library.
//!
//! Fetches a Reddit post with its full comment tree, renders every top-level
//! comment thread as a plain-text report, optionally packages the post's
//! media into a zip, and serves both through a small web form.

#![allow(clippy::needless_raw_string_hashes)]

pub mod components;
pub mod config;
pub mod constants;
pub mod media;
pub mod reddit;
pub mod report;
pub mod web;
