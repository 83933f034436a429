//! confstack - layered configuration resolution
//!
//! Re-exports [`confstack_core`]; the command line front end lives in the
//! `confstack-cli` crate.
pub use confstack_core::*;
