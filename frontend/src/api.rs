pub mod hosts;
pub mod utils;
pub mod version;

use crate::config::Config;

/// Absolute request URL for `path` under the installed base URL; relative
/// when no base URL applies.
pub fn api_url(path: &str) -> String {
    Config::slot().join(path)
}
