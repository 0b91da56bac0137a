//! Matchers, one module per precedence family.
//!
//! Each matcher is a pure function from the input text (and, where
//! needed, the reference context) to an optional match carrying the
//! consumed span. The engine tries the families in precedence order and
//! takes the first hit; within a family the leftmost occurrence wins.

pub mod all_day;
pub mod clock;
pub mod day_words;
pub mod location;
pub mod ranges;
pub mod relative;
