//! All-day markers: "all day", "full day", "entire day".
//!
//! These pin the event to 00:00–23:59 of the resolved date.

use crate::Span;

pub(crate) fn find(text: &str) -> Option<Span> {
    let re = regex!(r"(?i)\b(?:all[\s-]?day|full[\s-]?day|entire\s+day)\b");
    re.find(text).map(|m| Span::of(&m))
}
