use async_trait::async_trait;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::{Credentials, Mechanism},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::Deserialize;

use crate::{
    config::EmailConfig,
    error::{AppError, Result},
};

const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Seam to the mail transport. One call, one message; implementations open
/// and release their own session per send.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str, html: bool) -> Result<()>;
}

/// SMTP mailer authenticating with XOAUTH2. The bearer token is minted from
/// the configured refresh token on each send; the interactive authorization
/// flow that produced the refresh token is a one-time operator script and
/// lives outside this service.
pub struct SmtpMailer {
    config: EmailConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    async fn fetch_access_token(&self) -> Result<String> {
        let (client_id, client_secret, refresh_token) = match (
            self.config.google_client_id.as_deref(),
            self.config.google_client_secret.as_deref(),
            self.config.google_refresh_token.as_deref(),
        ) {
            (Some(id), Some(secret), Some(token)) => (id, secret, token),
            _ => {
                return Err(AppError::External(
                    "OAuth2 configuration incomplete".to_string(),
                ))
            }
        };

        let response = self
            .http
            .post(GOOGLE_TOKEN_URI)
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::External(format!("Token refresh failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::External(format!(
                "Token refresh failed with status {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::External(format!("Token refresh failed: {}", e)))?;

        Ok(token.access_token)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str, html: bool) -> Result<()> {
        let from = self.config.from_email.as_deref().ok_or_else(|| {
            AppError::External("FROM_EMAIL not configured".to_string())
        })?;

        let access_token = self.fetch_access_token().await?;

        let message = Message::builder()
            .from(from
                .parse()
                .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?)
            .to(to
                .parse()
                .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?)
            .subject(subject)
            .header(if html {
                ContentType::TEXT_HTML
            } else {
                ContentType::TEXT_PLAIN
            })
            .body(body.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to build message: {}", e)))?;

        // Fresh transport per message. The transport drops (and closes its
        // connection) at the end of this call whether the send succeeds or not.
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(
            &self.config.smtp_server,
        )
        .map_err(|e| AppError::External(format!("SMTP setup failed: {}", e)))?
        .port(self.config.smtp_port)
        .credentials(Credentials::new(from.to_string(), access_token))
        .authentication(vec![Mechanism::Xoauth2])
        .build();

        transport
            .send(message)
            .await
            .map_err(|e| AppError::External(format!("SMTP send failed: {}", e)))?;

        tracing::info!("Email sent successfully to {}", to);

        Ok(())
    }
}
