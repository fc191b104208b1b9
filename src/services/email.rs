use crate::{
    config::Config,
    errors::AppError,
    models::NotificationTemplate,
    services::templates::{escape_html, render_template},
};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
pub struct EmailService {
    config: Arc<Config>,
}

impl EmailService {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    fn build_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, AppError> {
        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        let transport =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::EmailError(e.to_string()))?
                .credentials(creds)
                .port(self.config.smtp_port)
                .build();

        Ok(transport)
    }

    /// Render a notification template and send it. The body is authored as
    /// plain text; the HTML part wraps it in the shared message frame.
    pub async fn send_notification(
        &self,
        recipient_email: &str,
        recipient_name: &str,
        template: &NotificationTemplate,
        vars: &HashMap<String, String>,
    ) -> Result<(), AppError> {
        let subject = render_template(&template.subject, vars);
        let text_body = render_template(&template.body, vars);
        let html_body = wrap_html(&self.config.email_from_name, &subject, &text_body);

        let from_mailbox = format!(
            "{} <{}>",
            self.config.email_from_name, self.config.email_from_address
        )
        .parse()
        .map_err(|e: lettre::address::AddressError| AppError::EmailError(e.to_string()))?;

        let to_mailbox = format!("{} <{}>", recipient_name, recipient_email)
            .parse()
            .map_err(|e: lettre::address::AddressError| AppError::EmailError(e.to_string()))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )
            .map_err(|e| AppError::EmailError(e.to_string()))?;

        let transport = self.build_transport()?;

        match transport.send(email).await {
            Ok(_) => {
                info!("Notification '{}' sent to {}", template.key, recipient_email);
                Ok(())
            }
            Err(e) => {
                error!(
                    "Failed to send notification '{}' to {}: {}",
                    template.key, recipient_email, e
                );
                Err(AppError::EmailError(e.to_string()))
            }
        }
    }
}

fn wrap_html(business_name: &str, subject: &str, text_body: &str) -> String {
    let paragraphs: String = text_body
        .split("\n\n")
        .map(|p| format!("    <p>{}</p>\n", escape_html(p).replace('\n', "<br/>")))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <style>
    body {{ font-family: Arial, sans-serif; background: #f4f4f4; color: #333; }}
    .container {{ max-width: 600px; margin: 30px auto; background: #fff; border-radius: 8px; overflow: hidden; box-shadow: 0 2px 8px rgba(0,0,0,0.1); }}
    .header {{ background: #7c3aed; color: #fff; padding: 24px 32px; }}
    .header h1 {{ margin: 0; font-size: 22px; }}
    .body {{ padding: 24px 32px; }}
    .footer {{ background: #f9fafb; padding: 16px 32px; font-size: 12px; color: #6b7280; text-align: center; }}
  </style>
</head>
<body>
<div class="container">
  <div class="header">
    <h1>{business}</h1>
    <p>{subject}</p>
  </div>
  <div class="body">
{paragraphs}  </div>
  <div class="footer">
    <p>This is an automated message from {business}. Please do not reply to this email.</p>
  </div>
</div>
</body>
</html>"#,
        business = escape_html(business_name),
        subject = escape_html(subject),
        paragraphs = paragraphs,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_wrapper_escapes_and_paragraphs() {
        let html = wrap_html("A & B Events", "Hi", "First <line>\n\nSecond");
        assert!(html.contains("A &amp; B Events"));
        assert!(html.contains("<p>First &lt;line&gt;</p>"));
        assert!(html.contains("<p>Second</p>"));
    }
}
