//! # sdvc-core — Foundational Types for the SDVC Stack
//!
//! This crate is the bedrock of the SDVC Stack. It defines the primitives
//! every other crate builds on; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One structured error type.** Every failure carries a fixed
//!    [`ErrorCode`] from a closed list, an operation locator, and a human
//!    message. No error is swallowed.
//!
//! 2. **Parsed-once pointers.** [`JsonPointer`] validates RFC 6901 syntax at
//!    construction; evaluation is infallible with respect to syntax.
//!
//! 3. **Typed label maps.** [`LabelMap`] is the only bridge between
//!    canonical (`c14n`) and pseudonymized (`b`) blank-node label spaces,
//!    and the only path to the compressed integer wire form.
//!
//! 4. **Quote-aware N-Quad rewriting.** Blank-node relabeling is a
//!    single-pass scanner, so overlapping label namespaces cannot alias
//!    and literal content is never rewritten.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sdvc-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod label_map;
pub mod nquads;
pub mod pointer;

// Re-export primary types for ergonomic imports.
pub use error::{ErrorCode, Result, SuiteError};
pub use label_map::LabelMap;
pub use pointer::JsonPointer;
