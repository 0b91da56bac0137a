/// A `&'static Regex` compiled once on first use. Every matcher pattern
/// in the crate goes through this so compilation cost is paid per
/// pattern, not per call.
#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}
