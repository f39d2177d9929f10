//! Decision rules for incident reports and machine usage.
//!
//! Everything here is pure: callers read the current rows, hand them in, and
//! act on the verdict inside the same transaction.

pub mod duplicate;
pub mod usage;
pub mod validate;
