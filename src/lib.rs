//! texpipe - Build-time texture packing orchestration
//!
//! This library provides functionality to:
//! - Describe source → destination packing pipelines in code or `texpipe.toml`
//! - Select the subdirectories of each source directory to pack
//! - Run an external packer once per selected directory and report progress

pub mod cli;
pub mod config;
pub mod pack;
