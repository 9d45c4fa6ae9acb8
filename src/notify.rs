use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{debug, info, warn};

/// Outbound notification sender.
///
/// Delivery is fire-and-forget: failures are logged and never surfaced to
/// the request that triggered them. Without an `SMTP_HOST` the mailer runs
/// in log-only mode, which is also what the tests use.
#[derive(Clone)]
pub struct Mailer {
    from: String,
    transport: Option<SmtpTransport>,
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailer")
            .field("from", &self.from)
            .field("smtp", &self.transport.is_some())
            .finish()
    }
}

impl Mailer {
    /// Build a mailer from `SMTP_HOST`, `SMTP_USER`, `SMTP_PASS` and
    /// `SMTP_FROM` environment variables.
    pub fn from_env() -> Self {
        let from = std::env::var("SMTP_FROM").unwrap_or_else(|_| "admin@crm.com".to_string());

        let transport = match std::env::var("SMTP_HOST") {
            Ok(host) => {
                let transport = match (std::env::var("SMTP_USER").ok(), std::env::var("SMTP_PASS").ok()) {
                    (Some(user), Some(pass)) => {
                        let creds = Credentials::new(user, pass);
                        match SmtpTransport::relay(&host) {
                            Ok(builder) => Some(builder.credentials(creds).build()),
                            Err(e) => {
                                warn!("Invalid SMTP relay host '{}': {}", host, e);
                                None
                            }
                        }
                    }
                    _ => Some(SmtpTransport::builder_dangerous(&host).build()),
                };
                transport
            }
            Err(_) => {
                debug!("SMTP_HOST not set, mailer running in log-only mode");
                None
            }
        };

        Self { from, transport }
    }

    /// Log-only mailer, used by the test setup.
    pub fn disabled() -> Self {
        Self {
            from: "admin@crm.com".to_string(),
            transport: None,
        }
    }

    fn send(&self, subject: &str, body: &str, to: &str) -> Result<(), String> {
        let Some(transport) = &self.transport else {
            info!("Mail (log-only) to {}: {} - {}", to, subject, body);
            return Ok(());
        };

        let email = Message::builder()
            .from(self.from.parse().map_err(|e| format!("invalid from address: {e}"))?)
            .to(to.parse().map_err(|e| format!("invalid to address: {e}"))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| format!("failed to build email: {e}"))?;

        transport
            .send(&email)
            .map_err(|e| format!("failed to send email: {e}"))?;
        Ok(())
    }

    /// Send from a detached task so delivery never blocks or fails the
    /// primary mutation.
    ///
    /// `SmtpTransport::send` is synchronous, so the task runs on the
    /// blocking pool instead of tying up an async worker.
    pub fn send_detached(&self, subject: &str, body: &str, to: &str) {
        let mailer = self.clone();
        let subject = subject.to_string();
        let body = body.to_string();
        let to = to.to_string();
        tokio::task::spawn_blocking(move || {
            if let Err(reason) = mailer.send(&subject, &body, &to) {
                warn!("Notification to {} not delivered: {}", to, reason);
            } else {
                debug!("Notification '{}' dispatched to {}", subject, to);
            }
        });
    }
}
