//! Transactional email via the Mailgun HTTP API.
//!
//! [`MailgunMailer`] posts form-encoded messages to
//! `{api_base}/v3/{domain}/messages`. When Mailgun is not configured,
//! [`MailgunConfig::from_env`] returns `None` and the server falls back to
//! [`LogMailer`], which only writes the message to the log.

use async_trait::async_trait;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// The HTTP request itself failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Mailgun returned a non-2xx status code.
    #[error("Mailgun returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
}

/// Result of a successful send.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentEmail {
    /// Provider-assigned message id, when the provider returns one.
    pub message_id: Option<String>,
}

/// The six-digit code email sent during signup.
pub fn verification_email(to: &str, code: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: format!("Your WebDash verification code: {code}"),
        text: format!(
            "Your verification code is {code}.\n\n\
             It expires in {} minutes. If you did not request it, you can ignore this email.",
            webdash_core::verification::CODE_TTL_MINUTES
        ),
        html: Some(format!(
            "<p>Your verification code is</p><p style=\"font-size:28px;letter-spacing:6px\"><strong>{code}</strong></p>\
             <p>It expires in {} minutes. If you did not request it, you can ignore this email.</p>",
            webdash_core::verification::CODE_TTL_MINUTES
        )),
    }
}

/// The "finish your questionnaire" email sent by the reminder sweep.
pub fn reminder_email(to: &str, name: &str, questionnaire_url: &str) -> EmailMessage {
    let greeting = if name.trim().is_empty() {
        "Hi there".to_string()
    } else {
        format!("Hi {}", name.trim())
    };
    EmailMessage {
        to: to.to_string(),
        subject: "Finish your website questionnaire".to_string(),
        text: format!(
            "{greeting},\n\nYour answers are saved. Pick up where you left off and we will \
             start building your website as soon as you submit:\n\n{questionnaire_url}\n"
        ),
        html: Some(format!(
            "<p>{greeting},</p><p>Your answers are saved. Pick up where you left off and we will \
             start building your website as soon as you submit.</p>\
             <p><a href=\"{questionnaire_url}\">Continue the questionnaire</a></p>"
        )),
    }
}

// ---------------------------------------------------------------------------
// Mailer trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<SentEmail, MailError>;
}

// ---------------------------------------------------------------------------
// Mailgun
// ---------------------------------------------------------------------------

const DEFAULT_API_BASE: &str = "https://api.mailgun.net";

/// Configuration for [`MailgunMailer`].
#[derive(Debug, Clone)]
pub struct MailgunConfig {
    pub api_key: String,
    pub domain: String,
    /// `https://api.mailgun.net`, or the EU endpoint.
    pub api_base: String,
    pub from_address: String,
}

impl MailgunConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` unless both `MAILGUN_API_KEY` and `MAILGUN_DOMAIN` are set.
    ///
    /// | Variable           | Required | Default                          |
    /// |--------------------|----------|----------------------------------|
    /// | `MAILGUN_API_KEY`  | yes      | -                                |
    /// | `MAILGUN_DOMAIN`   | yes      | -                                |
    /// | `MAILGUN_API_BASE` | no       | `https://api.mailgun.net`        |
    /// | `MAILGUN_FROM`     | no       | `WebDash <noreply@{domain}>`     |
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("MAILGUN_API_KEY").ok()?;
        let domain = std::env::var("MAILGUN_DOMAIN").ok()?;
        Some(Self {
            api_base: std::env::var("MAILGUN_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            from_address: std::env::var("MAILGUN_FROM")
                .unwrap_or_else(|_| format!("WebDash <noreply@{domain}>")),
            api_key,
            domain,
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/v3/{}/messages", self.api_base.trim_end_matches('/'), self.domain)
    }
}

#[derive(Debug, Deserialize)]
struct MailgunResponse {
    id: Option<String>,
}

pub struct MailgunMailer {
    client: reqwest::Client,
    config: MailgunConfig,
}

impl MailgunMailer {
    pub fn new(client: reqwest::Client, config: MailgunConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Mailer for MailgunMailer {
    async fn send(&self, message: &EmailMessage) -> Result<SentEmail, MailError> {
        let mut form = vec![
            ("from", self.config.from_address.as_str()),
            ("to", message.to.as_str()),
            ("subject", message.subject.as_str()),
            ("text", message.text.as_str()),
        ];
        if let Some(html) = &message.html {
            form.push(("html", html.as_str()));
        }

        let response = self
            .client
            .post(self.config.messages_url())
            .basic_auth("api", Some(&self.config.api_key))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MailgunResponse = response.json().await?;
        tracing::debug!(to = %message.to, message_id = ?parsed.id, "Email accepted by Mailgun");
        Ok(SentEmail {
            message_id: parsed.id,
        })
    }
}

// ---------------------------------------------------------------------------
// Log-only fallback
// ---------------------------------------------------------------------------

/// Mailer used when no provider is configured. Logs and reports success.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<SentEmail, MailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.text,
            "Email provider not configured, logging message instead"
        );
        Ok(SentEmail::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
