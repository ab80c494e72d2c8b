//! Global keyboard hook adapters

mod rdev;

pub use rdev::{canonicalize, RdevKeySource};
