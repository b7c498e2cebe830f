//! Texture packing pipelines
//!
//! Drives an external texture packer over the subdirectories of configured
//! source directories, one tool invocation per qualifying subdirectory.
//!
//! # Overview
//!
//! A run consists of:
//! - **Validation**: required fields and filter rules, before any I/O
//! - **Selection**: list immediate subdirectories and apply include/exclude
//! - **Execution**: build the argument vector and run the tool per directory
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use texpipe::config::load_config;
//! use texpipe::pack::{ConsoleProgress, PackContext, PackEngine};
//!
//! let config = load_config(None)?;
//! let context = PackContext::new(config, project_root);
//! let engine = PackEngine::new(context.engine_options())
//!     .with_reporter(Arc::new(ConsoleProgress::new()));
//!
//! let result = engine.run(&context.definitions())?;
//! println!("{}", result.summary());
//! ```

pub mod command;
pub mod context;
pub mod declare;
pub mod definition;
pub mod engine;
pub mod error;
pub mod filter;
pub mod parameter;
pub mod progress;
pub mod result;
pub mod runner;

pub use command::*;
pub use context::*;
pub use declare::*;
pub use definition::*;
pub use engine::*;
pub use error::*;
pub use filter::*;
pub use parameter::*;
pub use progress::*;
pub use result::*;
pub use runner::*;
