//! SMTP mailbox checker
//!
//! Dials the highest-priority MX on port 25 and walks a minimal SMTP
//! dialogue (`HELO`, `MAIL FROM`, then `VRFY` and/or `RCPT TO` depending on
//! configuration). Only the primary MX is dialed; there is no failover to
//! secondary exchangers.

use crate::checks::{details_map, extract_domain};
use crate::dns::DnsResolver;
use crate::{Dialer, SmtpSettings, ValidationResult};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::debug;

/// Outcome of one SMTP dialogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpProbe {
    pub code: u16,
    pub message: String,
    pub can_receive: bool,
    pub is_mailbox: bool,
    /// Reserved; catch-all detection is not performed.
    pub is_catch_all: bool,
}

impl SmtpProbe {
    fn transport_failure(message: String) -> Self {
        Self {
            code: 0,
            message,
            can_receive: false,
            is_mailbox: false,
            is_catch_all: false,
        }
    }
}

/// Verifies deliverability by talking to the domain's primary MX.
pub struct SmtpCheck {
    resolver: DnsResolver,
    settings: SmtpSettings,
    dialer: Arc<dyn Dialer>,
}

impl SmtpCheck {
    pub fn new(resolver: DnsResolver, settings: SmtpSettings, dialer: Arc<dyn Dialer>) -> Self {
        Self {
            resolver,
            settings,
            dialer,
        }
    }

    pub async fn validate(&self, email: &str) -> ValidationResult {
        let start = Instant::now();
        let domain = extract_domain(email);

        let records = match self.resolver.mx_records(&domain).await {
            Ok(records) => records,
            Err(e) => {
                return ValidationResult {
                    valid: false,
                    message: "Could not resolve MX records".to_string(),
                    details: serde_json::Map::new(),
                    duration: start.elapsed(),
                    error: Some(e.to_string()),
                }
            }
        };

        let Some(primary) = records.first() else {
            return ValidationResult {
                valid: false,
                message: "No MX records found".to_string(),
                details: serde_json::Map::new(),
                duration: start.elapsed(),
                error: None,
            };
        };

        let probe = self.probe(email, &primary.host).await;

        ValidationResult {
            valid: probe.can_receive,
            message: probe.message.clone(),
            details: details_map(json!({
                "smtp_response": probe,
                "mx_host": primary.host,
            })),
            duration: start.elapsed(),
            error: None,
        }
    }

    /// Dial a mail exchanger and run the dialogue. `QUIT` is issued on every
    /// exit path once the connection is up.
    pub(crate) async fn probe(&self, email: &str, host: &str) -> SmtpProbe {
        debug!("Probing {} via {}", email, host);

        let stream = match self.dialer.connect(host, 25).await {
            Ok(stream) => stream,
            Err(e) => return SmtpProbe::transport_failure(format!("Connection failed: {}", e)),
        };

        let mut session = SmtpSession::new(stream, self.settings.timeout);
        let probe = self.dialogue(&mut session, email).await;
        session.quit().await;
        probe
    }

    async fn dialogue(&self, session: &mut SmtpSession, email: &str) -> SmtpProbe {
        match session.read_reply().await {
            Ok((220, _)) => {}
            Ok((code, message)) => {
                return SmtpProbe::transport_failure(format!(
                    "SMTP greeting failed: {} {}",
                    code, message
                ))
            }
            Err(e) => return SmtpProbe::transport_failure(format!("SMTP greeting failed: {}", e)),
        }

        match session.command(&format!("HELO {}", self.settings.from_domain)).await {
            Ok((code, _)) if (200..300).contains(&code) => {}
            Ok((code, message)) => {
                return SmtpProbe::transport_failure(format!("HELO failed: {} {}", code, message))
            }
            Err(e) => return SmtpProbe::transport_failure(format!("HELO failed: {}", e)),
        }

        match session
            .command(&format!("MAIL FROM:<{}>", self.settings.from_email))
            .await
        {
            Ok((code, _)) if (200..300).contains(&code) => {}
            Ok((code, message)) => {
                return SmtpProbe::transport_failure(format!(
                    "MAIL FROM failed: {} {}",
                    code, message
                ))
            }
            Err(e) => return SmtpProbe::transport_failure(format!("MAIL FROM failed: {}", e)),
        }

        if self.settings.enable_vrfy {
            match session.command(&format!("VRFY {}", email)).await {
                // 250/251 is a positive confirmation; 252 ("cannot verify")
                // and refusals fall through to RCPT.
                Ok((code @ (250 | 251), message)) => {
                    return SmtpProbe {
                        code,
                        message: if message.is_empty() {
                            "Mailbox verified".to_string()
                        } else {
                            message
                        },
                        can_receive: true,
                        is_mailbox: code == 250,
                        is_catch_all: false,
                    }
                }
                Ok((code, message)) => {
                    debug!("VRFY inconclusive ({} {}), continuing", code, message);
                }
                Err(e) => return SmtpProbe::transport_failure(format!("VRFY failed: {}", e)),
            }
        }

        if self.settings.enable_rcpt {
            return Self::rcpt(session, email).await;
        }

        SmtpProbe {
            code: 250,
            message: "SMTP connection successful".to_string(),
            can_receive: true,
            is_mailbox: false,
            is_catch_all: false,
        }
    }

    async fn rcpt(session: &mut SmtpSession, email: &str) -> SmtpProbe {
        let (code, message) = match session.command(&format!("RCPT TO:<{}>", email)).await {
            Ok(reply) => reply,
            Err(e) => return SmtpProbe::transport_failure(e.to_string()),
        };

        let mut probe = SmtpProbe {
            code,
            message,
            can_receive: false,
            is_mailbox: false,
            is_catch_all: false,
        };

        match code {
            200..=299 => {
                probe.can_receive = true;
                probe.is_mailbox = true;
                probe.message = "Recipient accepted".to_string();
            }
            550 => probe.message = "Mailbox does not exist".to_string(),
            551 => probe.message = "User not local".to_string(),
            400..=499 => probe.message = "Temporary failure".to_string(),
            // Any other refusal keeps the server's own words.
            _ => {}
        }

        probe
    }
}

/// One SMTP connection with deadline-bound reads and multiline reply
/// handling.
struct SmtpSession {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    timeout: Duration,
}

impl SmtpSession {
    fn new(stream: TcpStream, timeout: Duration) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            timeout,
        }
    }

    async fn command(&mut self, command: &str) -> std::io::Result<(u16, String)> {
        self.writer
            .write_all(format!("{}\r\n", command).as_bytes())
            .await?;
        self.read_reply().await
    }

    /// Read one (possibly multiline) reply and return the code with the
    /// joined text.
    async fn read_reply(&mut self) -> std::io::Result<(u16, String)> {
        let mut text = Vec::new();
        loop {
            let mut line = String::new();
            let read = tokio::time::timeout(self.timeout, self.reader.read_line(&mut line))
                .await
                .map_err(|_| {
                    std::io::Error::new(std::io::ErrorKind::TimedOut, "SMTP read timed out")
                })??;
            if read == 0 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed mid-reply",
                ));
            }

            let line = line.trim_end_matches(['\r', '\n']);
            let code: u16 = line
                .get(..3)
                .and_then(|digits| digits.parse().ok())
                .ok_or_else(|| {
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("malformed SMTP reply: {:?}", line),
                    )
                })?;

            text.push(line.get(4..).unwrap_or("").to_string());
            if line.as_bytes().get(3) != Some(&b'-') {
                return Ok((code, text.join("\n")));
            }
        }
    }

    /// Best-effort `QUIT`; the peer may already be gone.
    async fn quit(&mut self) {
        if self.writer.write_all(b"QUIT\r\n").await.is_ok() {
            let _ = self.read_reply().await;
        }
    }
}
