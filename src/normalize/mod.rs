//! Normalization of output names and document links
//!
//! Both operations are pure: the same input always yields the same output, and
//! applying [`absolutify`] to its own output changes nothing.

mod filename;
mod links;

pub use filename::name_for;
pub use links::absolutify;
