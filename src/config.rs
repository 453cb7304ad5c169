//! Connection page size configuration

use serde::Deserialize;

use crate::pagination::ConnectionArguments;

/// Page size limits applied to client supplied connection arguments
///
/// Both limits are off by default, which leaves arguments untouched.
/// Deserializes from an application's configuration, e.g.
/// `{ "default_page_size": 20, "max_page_size": 100 }`.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Used as `first` when neither `first` nor `last` is given
    pub default_page_size: Option<usize>,

    /// Upper bound for `first` and `last`
    pub max_page_size: Option<usize>,
}

impl ConnectionConfig {
    /// Apply the limits to `args`
    pub fn apply(&self, args: &ConnectionArguments) -> ConnectionArguments {
        let mut args = args.clone();

        if args.first.is_none() && args.last.is_none() {
            args.first = self.default_page_size.map(to_count);
        }

        if let Some(max) = self.max_page_size.map(to_count) {
            args.first = args.first.map(|first| first.min(max));
            args.last = args.last.map(|last| last.min(max));
        }

        args
    }
}

fn to_count(size: usize) -> i32 {
    i32::try_from(size).unwrap_or(i32::MAX)
}
