pub mod autofix;
pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod serialize;
pub mod validate;
pub mod wasm;
pub mod workspace;
