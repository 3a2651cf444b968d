use chrono::Utc;
use uuid::Uuid;

/// Source of candidate sample identifiers.
///
/// The ingestor checks each candidate against the store and asks for another
/// on collision, so implementations need not guarantee uniqueness.
pub trait SampleIdGenerator {
    /// Produce the next candidate identifier
    fn next_identifier(&self) -> String;
}

impl<F> SampleIdGenerator for F
where
    F: Fn() -> String,
{
    fn next_identifier(&self) -> String {
        self()
    }
}

/// Generates `S-<UTC timestamp>-<random hex>` identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampIdGenerator;

impl SampleIdGenerator for TimestampIdGenerator {
    fn next_identifier(&self) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!(
            "S-{}-{}",
            Utc::now().format("%Y%m%dT%H%M%S%.3fZ"),
            &suffix[..8]
        )
    }
}
