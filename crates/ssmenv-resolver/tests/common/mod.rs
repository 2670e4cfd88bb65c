//! Common test infrastructure for ssmenv-resolver tests
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Modules
//!
//! - `fakes`: in-memory store, connector, credential issuer and clock
//! - `builders`: engine harness wiring the fakes together

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod fakes;

pub use builders::*;
pub use fakes::*;
