// ABOUTME: Email collaborator seam: message model, mailer trait, and JSON sender config.
// ABOUTME: A front end supplies the transport; sends run on a worker thread off the mutator.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while configuring or sending mail.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("mail configuration is incomplete; set address, password, and server")]
    IncompleteConfig,

    #[error("send failed: {0}")]
    Send(String),
}

/// SMTP sender settings, persisted as a small JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailerConfig {
    pub address: String,
    pub password: String,
    pub server: String,
    pub port: u16,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            password: String::new(),
            server: String::new(),
            port: 587,
        }
    }
}

impl MailerConfig {
    /// Load the config file, or the default (incomplete) config when
    /// the file does not exist yet.
    pub fn load(path: &Path) -> Result<Self, MailError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), MailError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Whether enough is configured to attempt a send.
    pub fn is_complete(&self) -> bool {
        !self.address.is_empty() && !self.password.is_empty() && !self.server.is_empty()
    }
}

/// One outgoing delivery email.
#[derive(Debug, Clone, PartialEq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: Option<PathBuf>,
}

/// The transport seam. The desktop front end implements this over its
/// SMTP library; tests implement it with a recorder.
pub trait Mailer {
    fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

/// Send on a detached worker thread. The worker owns only the captured
/// message; the caller polls the returned channel for the outcome.
pub fn send_in_background<M>(mailer: M, message: MailMessage) -> Receiver<Result<(), MailError>>
where
    M: Mailer + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = mailer.send(&message);
        if let Err(err) = &result {
            tracing::warn!(to = %message.to, %err, "mail send failed");
        }
        let _ = tx.send(result);
    });
    rx
}
