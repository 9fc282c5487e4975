use reqwest::Client;
use serde::Serialize;

use crate::core::ports::notifier::Notifier;
use crate::error::Error;

// Welcome mail via an HTTP mail API (Mailgun-style JSON endpoint).
pub struct MailApi {
    client: Client,
    endpoint: String,
    api_key: String,
    from: String,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: String,
}

impl MailApi {
    pub fn new(endpoint: &str, api_key: &str, from: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            from: from.into(),
        }
    }
}

impl Notifier for MailApi {
    async fn send_welcome(&self, address: &str, name: &str) -> Result<(), Error> {
        let message = Message {
            from: &self.from,
            to: address,
            subject: "Welcome to Our Platform!",
            text: format!(
                "Hi {},\n\nWelcome to our platform! We are excited to have you join our community.\n\nBest regards,\nThe Team",
                name
            ),
        };
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&message)
            .send()
            .await
            .map_err(|e| Error::Notifier(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Error::Notifier(format!("mail api returned {}", response.status())));
        }
        Ok(())
    }
}
