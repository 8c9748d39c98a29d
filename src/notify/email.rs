// src/notify/email.rs
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use super::Notifier;
use crate::config::EmailConfig;

/// Mails the clip as an attachment over SMTPS (implicit TLS).
pub struct EmailNotifier {
    enabled: bool,
    from: Mailbox,
    to: Mailbox,
    mailer: SmtpTransport,
}

impl EmailNotifier {
    pub fn new(cfg: &EmailConfig) -> Result<Self> {
        let from: Mailbox = cfg
            .sender_email
            .parse()
            .context("sender_email is not a valid email address")?;
        let to: Mailbox = cfg
            .receiver_email
            .parse()
            .context("receiver_email is not a valid email address")?;

        let creds = Credentials::new(cfg.sender_email.clone(), cfg.sender_password.clone());
        let mailer = SmtpTransport::relay(&cfg.smtp_host)
            .context("failed to create SMTP transport")?
            .port(cfg.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self {
            enabled: cfg.enabled,
            from,
            to,
            mailer,
        })
    }

    pub fn build_message(&self, subject: &str, body: &str, video: &Path) -> Result<Message> {
        let builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject);

        let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(body.to_string()));

        if video.is_file() {
            let bytes = std::fs::read(video).with_context(|| format!("reading {:?}", video))?;
            let filename = video
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "clip".to_string());
            let content_type = ContentType::parse("application/octet-stream")
                .map_err(|e| anyhow!("content type: {:?}", e))?;
            parts = parts.singlepart(Attachment::new(filename).body(bytes, content_type));
        } else {
            log::warn!("[email] attachment not found: {:?}", video);
        }

        builder
            .multipart(parts)
            .context("failed to build email message")
    }
}

impl Notifier for EmailNotifier {
    fn notify_video(&self, subject: &str, message: &str, video: &Path) -> Result<()> {
        log::info!(
            "[email] to='{}' subject='{}' video={:?}",
            self.to,
            subject,
            video
        );
        if !self.enabled {
            log::debug!("[email] notification disabled");
            return Ok(());
        }

        let email = self.build_message(subject, message, video)?;
        self.mailer
            .send(&email)
            .context("failed to send email via SMTP")?;

        log::info!("[email] sent");
        Ok(())
    }
}
