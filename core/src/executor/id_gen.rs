use uuid::Uuid;

/// Issues opaque identifiers for cached statuses.
///
/// Ids only need to be effectively unique; the cache executor regenerates on
/// the rare collision, so a generator does not have to guarantee it.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Default generator: a random UUID v4 rendered as text.
#[derive(Debug, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
