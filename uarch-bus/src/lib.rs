//! Shared seam for the RV64I one-step engine: bit primitives, the
//! protocol's fixed addresses/codes, and the abstract memory interface
//! the executor is written against.
//!
//! Nothing in this crate knows about RV64I encoding. It plays the same
//! role `emu-core` plays for the CPU crates built on top of it: a small,
//! dependency-free trait crate that concrete backends implement.

pub mod bits;
pub mod consts;
pub mod memory;
pub mod trap;

pub use memory::UarchBus;
