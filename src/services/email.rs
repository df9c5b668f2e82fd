// src/services/email.rs

use crate::{config::Config, errors::AppError};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use rust_decimal::Decimal;
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

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
            .map_err(|e| AppError::Email(e.to_string()))?
            .credentials(creds)
            .port(self.config.smtp_port)
            .build();

        Ok(transport)
    }

    async fn send(&self, to_name: &str, to_address: &str, subject: String, html: String, text: String) -> Result<(), AppError> {
        let from_mailbox = format!(
            "{} <{}>",
            self.config.email_from_name, self.config.email_from_address
        )
        .parse()
        .map_err(|e: lettre::address::AddressError| AppError::Email(e.to_string()))?;

        let to_mailbox = format!("{} <{}>", to_name, to_address)
            .parse()
            .map_err(|e: lettre::address::AddressError| AppError::Email(e.to_string()))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html),
                    ),
            )
            .map_err(|e| AppError::Email(e.to_string()))?;

        let transport = self.build_transport()?;

        match transport.send(email).await {
            Ok(_) => {
                info!("Email sent to {}", to_address);
                Ok(())
            }
            Err(e) => {
                error!("Failed to send email to {}: {}", to_address, e);
                Err(AppError::Email(e.to_string()))
            }
        }
    }

    /// Notify an employee that their monthly salary has been computed.
    pub async fn send_monthly_salary_email(
        &self,
        employee_email: &str,
        employee_name: &str,
        month: i32,
        year: i32,
        total_salary: Decimal,
    ) -> Result<(), AppError> {
        let subject = format!("Your salary for {:02}/{} is ready", month, year);
        let amount = format_amount(total_salary);

        let html = format!(
            "<html><body>\
             <p>Hi {employee_name},</p>\
             <p>Your salary for <strong>{month:02}/{year}</strong> has been computed: \
             <strong>{amount}</strong>.</p>\
             <p>Contact HR for a detailed breakdown.</p>\
             </body></html>"
        );
        let text = format!(
            "Hi {employee_name},\n\nYour salary for {month:02}/{year} has been computed: {amount}.\n\nContact HR for a detailed breakdown.\n"
        );

        self.send(employee_name, employee_email, subject, html, text)
            .await
    }

    /// Notify a guardian about the decision on a team application.
    pub async fn send_application_decision_email(
        &self,
        guardian_email: &str,
        player_name: &str,
        team_name: &str,
        approved: bool,
    ) -> Result<(), AppError> {
        let verdict = if approved { "approved" } else { "rejected" };
        let subject = format!("Application for {team_name}: {verdict}");

        let html = format!(
            "<html><body>\
             <p>The application of <strong>{player_name}</strong> to <strong>{team_name}</strong> \
             has been <strong>{verdict}</strong>.</p>\
             </body></html>"
        );
        let text =
            format!("The application of {player_name} to {team_name} has been {verdict}.\n");

        self.send(player_name, guardian_email, subject, html, text)
            .await
    }
}

fn format_amount(amount: Decimal) -> String {
    format!("Rp{:.2}", amount)
}
