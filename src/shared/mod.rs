pub mod lenient;
pub mod table;

pub use lenient::*;
pub use table::*;

use thiserror::Error;

/// A value outside one of the fixed enumerations the API and the
/// normalizer accept.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {name} {got:?}, expected one of {expected:?}")]
pub struct InvalidArgument {
    pub name: &'static str,
    pub got: String,
    pub expected: &'static [&'static str],
}

impl InvalidArgument {
    pub fn new(name: &'static str, got: &str, expected: &'static [&'static str]) -> Self {
        Self {
            name,
            got: got.to_string(),
            expected,
        }
    }
}

/// Joins a tag list (facilities, payment methods, weekdays) into one cell.
pub fn join_tags<S: AsRef<str>>(tags: &[S]) -> String {
    tags.iter()
        .map(|tag| tag.as_ref())
        .collect::<Vec<_>>()
        .join(",")
}

#[test]
fn join_tags_keeps_order() {
    assert_eq!(join_tags(&["MON", "TUE", "PH"]), "MON,TUE,PH");
    assert_eq!(join_tags::<&str>(&[]), "");
}
