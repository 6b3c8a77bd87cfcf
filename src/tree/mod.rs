//! Tree node storage used by the catalog model

mod node;

pub use node::*;
