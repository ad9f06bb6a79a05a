//! Range-aware streaming support

mod range;

pub use range::{RangeError, StreamRange};
