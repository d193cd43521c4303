//! fxconv Common Types
//!
//! This crate contains the types shared by the conversion core and its hosts:
//! unit codes, the session rate table, and the errors raised while building it.

pub mod monetary;
pub mod error;

pub use monetary::*;
pub use error::*;
