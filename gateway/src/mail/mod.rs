//! Outbound mail: async SMTP transport and the supplier notice template.

pub mod template;

pub use template::{render_supplier_notice, EmailContent};

use anyhow::{Context, Result};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::config::Config;

/// Async SMTP mailer for order-fulfillment notices.
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    /// Build the transport from configuration: implicit TLS when
    /// `SMTP_SECURE` is set, STARTTLS otherwise; credentials only when a
    /// user is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = if config.smtp_secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
        }
        .context("Failed to configure SMTP relay")?
        .port(config.smtp_port);

        if !config.smtp_user.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_user.clone(),
                config.smtp_pass.clone(),
            ));
        }

        let from = if config.smtp_from.is_empty() {
            warn!("smtp_from_unconfigured");
            "no-reply@localhost".parse::<Mailbox>().expect("static address")
        } else {
            config
                .smtp_from
                .parse::<Mailbox>()
                .with_context(|| format!("Invalid SMTP from address: {}", config.smtp_from))?
        };

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    /// Probe the relay and report reachability. Failures are logged;
    /// callers decide whether to continue.
    pub async fn verify(&self) -> bool {
        match self.transport.test_connection().await {
            Ok(true) => {
                info!("smtp_connection_verified");
                true
            }
            Ok(false) => {
                warn!("smtp_connection_not_ready");
                false
            }
            Err(e) => {
                warn!(error = %e, "smtp_connection_failed");
                false
            }
        }
    }

    /// Send one notice as a plain-text + HTML alternative message.
    pub async fn send_notice(
        &self,
        to: &str,
        subject: &str,
        content: &EmailContent,
    ) -> Result<()> {
        let recipient = to
            .parse::<Mailbox>()
            .with_context(|| format!("Invalid recipient address: {to}"))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(
                content.text.clone(),
                content.html.clone(),
            ))
            .context("Failed to build email message")?;

        self.transport
            .send(message)
            .await
            .context("Failed to send email")?;

        info!(to = %to, subject = %subject, "notice_sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(port: u16) -> Config {
        Config {
            port: 3000,
            openpay_merchant_id: String::new(),
            openpay_private_key: String::new(),
            openpay_production: false,
            openpay_api_url: None,
            directus_url: String::new(),
            webhook_token: String::new(),
            directus_event_webhook: None,
            directus_charge_webhook: None,
            smtp_host: "127.0.0.1".to_string(),
            smtp_port: port,
            smtp_secure: false,
            smtp_user: "mailer".to_string(),
            smtp_pass: "secret".to_string(),
            smtp_from: "Pedidos <pedidos@example.com>".to_string(),
            request_timeout_ms: 1_000,
            default_redirect_url: String::new(),
        }
    }

    #[tokio::test]
    async fn test_from_config_builds_transport() {
        assert!(Mailer::from_config(&test_config(587)).is_ok());
    }

    #[tokio::test]
    async fn test_empty_from_falls_back() {
        let mut config = test_config(587);
        config.smtp_from = String::new();
        let mailer = Mailer::from_config(&config).unwrap();
        assert_eq!(mailer.from.email.to_string(), "no-reply@localhost");
    }

    #[tokio::test]
    async fn test_verify_reports_unreachable_relay() {
        // Port 1 is never an SMTP relay; verify must not panic or hang.
        let mailer = Mailer::from_config(&test_config(1)).unwrap();
        assert!(!mailer.verify().await);
    }
}
