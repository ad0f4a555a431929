use serde::Deserialize;

/// Default bound on how deeply `from_nested` submission requirements may nest.
pub const DEFAULT_MAX_REQUIREMENT_DEPTH: usize = 16;

/// Settings applied when presentation definitions are constructed or decoded.
///
/// ```
/// # use prex::config::Config;
/// let config: Config = serde_json::from_str(r#"{ "max_requirement_depth": 4 }"#).unwrap();
/// assert_eq!(config.max_requirement_depth, 4);
/// ```
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Maximum nesting depth of a submission requirement tree. A requirement
    /// drawing from a group has depth 1.
    pub max_requirement_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_requirement_depth: DEFAULT_MAX_REQUIREMENT_DEPTH,
        }
    }
}
