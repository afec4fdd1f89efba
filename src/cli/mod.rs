//! # CLI Module
//!
//! Command-line front end for inspecting plugin documents without running the
//! gateway. Every subcommand loads one plugin per `--spec` file, selects
//! plugins with `--plugins` (or `OASMUX_PLUGINS`), and initializes an
//! [`OpenApi`](crate::openapi::OpenApi) context from them.
//!
//! ## Commands
//!
//! - `merge` - print the merged specification served to clients
//! - `routes` - register every path and print one line per method
//! - `match` - match a method and path, printing the tag and typed parameters
//!
//! ## Usage
//!
//! ```bash
//! oasmux merge --spec jobs.yaml --spec nodes.yaml --version-label Slurm-24.05
//! oasmux routes --spec jobs.yaml
//! oasmux match --spec jobs.yaml GET /slurm/v0.0.40/job/7
//! oasmux routes --spec jobs.yaml --plugins list
//! ```

mod commands;

pub use commands::{run, Cli, Commands, DocumentArgs};
