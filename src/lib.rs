//! Lux 2048 (workspace facade crate).
//!
//! This package keeps a single `lux_2048::{core,net,types}` public API while
//! the implementation lives in dedicated crates under `crates/`.

pub use lux_2048_core as core;
pub use lux_2048_net as net;
pub use lux_2048_types as types;
