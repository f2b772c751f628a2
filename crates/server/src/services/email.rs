//! Email service for one-time codes and order confirmations.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use thiserror::Error;

use local_crust_core::Price;

use crate::config::EmailConfig;
use crate::services::auth::otp::OTP_VALIDITY;

const SENDER_NAME: &str = "Local Crust Bakery";

#[derive(Template)]
#[template(path = "email/otp.html")]
struct OtpEmailHtml<'a> {
    code: &'a str,
    valid_minutes: i64,
}

#[derive(Template)]
#[template(path = "email/otp.txt")]
struct OtpEmailText<'a> {
    code: &'a str,
    valid_minutes: i64,
}

#[derive(Template)]
#[template(path = "email/order_confirmed.html")]
struct OrderConfirmedHtml<'a> {
    order_number: &'a str,
    total: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_confirmed.txt")]
struct OrderConfirmedText<'a> {
    order_number: &'a str,
    total: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_email.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: from_address(&config.smtp_email),
        })
    }

    /// Send a login code.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_otp(&self, to: &str, code: &str) -> Result<(), EmailError> {
        let valid_minutes = OTP_VALIDITY.num_minutes();
        let html = OtpEmailHtml {
            code,
            valid_minutes,
        }
        .render()?;
        let text = OtpEmailText {
            code,
            valid_minutes,
        }
        .render()?;

        self.send_multipart_email(to, "Your Local Crust OTP Code", &text, &html)
            .await
    }

    /// Send the order confirmation after a successful payment.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_order_confirmation(
        &self,
        to: &str,
        order_number: &str,
        total: Decimal,
    ) -> Result<(), EmailError> {
        let total = Price::inr(total).display();
        let html = OrderConfirmedHtml {
            order_number,
            total: &total,
        }
        .render()?;
        let text = OrderConfirmedText {
            order_number,
            total: &total,
        }
        .render()?;

        self.send_multipart_email(to, &format!("Order Confirmed - {order_number}"), &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

fn from_address(smtp_email: &str) -> String {
    format!("{SENDER_NAME} <{smtp_email}>")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_address_is_mailbox() {
        let from = from_address("orders@localcrust.in");
        assert_eq!(from, "Local Crust Bakery <orders@localcrust.in>");
        assert!(from.parse::<lettre::message::Mailbox>().is_ok());
    }

    #[test]
    fn test_otp_templates_render_code() {
        let html = OtpEmailHtml {
            code: "482913",
            valid_minutes: 5,
        }
        .render()
        .unwrap();
        let text = OtpEmailText {
            code: "482913",
            valid_minutes: 5,
        }
        .render()
        .unwrap();

        assert!(html.contains("482913"));
        assert!(html.contains("5 minutes"));
        assert!(text.contains("482913"));
    }

    #[test]
    fn test_order_templates_render_total() {
        let total = Price::inr(Decimal::new(24950, 2)).display();
        let text = OrderConfirmedText {
            order_number: "LC20260101120000",
            total: &total,
        }
        .render()
        .unwrap();

        assert!(text.contains("LC20260101120000"));
        assert!(text.contains("₹249.50"));
    }
}
