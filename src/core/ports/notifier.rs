use crate::error::Error;

// Delivery is best-effort: callers log failures instead of propagating
// them, registration never rolls back over a lost mail.
pub trait Notifier {
    async fn send_welcome(&self, address: &str, name: &str) -> Result<(), Error>;
}
