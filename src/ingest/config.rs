/// Configuration for the experiment ingestor
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Generated sample identifiers tried before accepting a collision
    pub identifier_attempts: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            identifier_attempts: 10,
        }
    }
}
