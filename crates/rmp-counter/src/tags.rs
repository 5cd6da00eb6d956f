//! Stable element identifiers used by UI automation.
//!
//! Every frontend attaches these to the matching element so the same test
//! driver works against all of them.

pub const DECREMENT_BUTTON: &str = "decrementButton";
pub const INCREMENT_BUTTON: &str = "incrementButton";
pub const COUNTER_VALUE: &str = "counterValue";
