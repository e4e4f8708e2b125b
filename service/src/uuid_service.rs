use mockall::automock;
use uuid::Uuid;

/// Indirection around id generation so tests can assert on deterministic,
/// labeled ids instead of random ones.
#[automock]
pub trait UuidService {
    fn new_uuid(&self, usage: &str) -> Uuid;
}
