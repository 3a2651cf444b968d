/// Configuration for the search ranker
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Page size used when a request does not set one
    pub default_limit: usize,

    /// Largest accepted page size
    pub max_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}
