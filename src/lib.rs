//! Warmload - compile interpreted source files as they are loaded
//!
//! When a host process finishes loading an interpreted source file, Warmload
//! compiles it, asks the host to load the compiled artifact in the background,
//! and suppresses the remaining after-load actions so they run once, against
//! the artifact.
//!
//! # Architecture
//!
//! ```text
//! warmload-config/  - Exclusion policy (pure data, JSON policy files)
//! warmload-log/     - Structured logging passed explicitly
//! warmload-core/    - Filter, compile-and-swap engine, load interceptor
//! warmload-api/     - enable()/disable() facade and unified errors
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use warmload::{InProcessHost, PolicyConfig, Warmload, WarmloadConfig};
//!
//! let host = InProcessHost::new(linker, [".el"], logger.clone());
//! let mut warmload = Warmload::new(
//!     host.bindings(compiler),
//!     WarmloadConfig::new(PolicyConfig::reference(Some(init_file))).with_logger(logger),
//! );
//! warmload.enable();
//! ```

pub use warmload_api::*;
