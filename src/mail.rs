use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};
use log::{error, info};

/// SMTP provider endpoint. Delivery uses implicit TLS on the standard
/// secure submission port (465).
pub const SMTP_HOST: &str = "smtp.gmail.com";

/// Sender identity and credential for outbound mail.
///
/// The environment (`EMAIL_USER` / `EMAIL_PASSWORD`) is read once at the
/// process boundary; this struct only ever sees the resolved values.
#[derive(Debug)]
pub struct Mailer {
    sender: String,
    password: String,
}

impl Mailer {
    /// Resolves the sender address and credential, requiring both to be
    /// present and non-empty.
    #[must_use]
    pub fn resolve(sender: Option<String>, password: Option<String>) -> Option<Self> {
        let sender = sender.filter(|s| !s.is_empty())?;
        let password = password.filter(|s| !s.is_empty())?;
        Some(Self { sender, password })
    }

    /// Sends `body` to `to` as a multipart message: the plain-text part is
    /// `body` verbatim, and the HTML part turns each non-blank line into a
    /// list item under a `subject` heading.
    ///
    /// Every failure is logged and collapsed to `false`; nothing panics and
    /// no error escapes.
    pub fn send(&self, to: &str, subject: &str, body: &str) -> bool {
        let from: Mailbox = match self.sender.parse() {
            Ok(mailbox) => mailbox,
            Err(err) => {
                error!("Endereço do remetente inválido ({}): {err}", self.sender);
                return false;
            }
        };
        let to_mailbox: Mailbox = match to.parse() {
            Ok(mailbox) => mailbox,
            Err(err) => {
                error!("Endereço do destinatário inválido ({to}): {err}");
                return false;
            }
        };
        let message = match Message::builder()
            .from(from)
            .to(to_mailbox)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(
                body.to_string(),
                html_body(subject, body),
            )) {
            Ok(message) => message,
            Err(err) => {
                error!("Falha ao montar a mensagem: {err}");
                return false;
            }
        };
        let transport = match SmtpTransport::relay(SMTP_HOST) {
            Ok(builder) => builder
                .credentials(Credentials::new(
                    self.sender.clone(),
                    self.password.clone(),
                ))
                .build(),
            Err(err) => {
                error!("Falha ao configurar o transporte SMTP: {err}");
                return false;
            }
        };
        match transport.send(&message) {
            Ok(_) => {
                info!("E-mail enviado com sucesso para {to}!");
                true
            }
            Err(err) if err.is_permanent() => {
                error!("Erro de autenticação: verifique usuário e senha. ({err})");
                false
            }
            Err(err) if err.is_transient() => {
                error!("Erro SMTP: {err}");
                false
            }
            Err(err) => {
                error!("Erro inesperado: {err}");
                false
            }
        }
    }
}

/// Sends a report body by email, resolving credentials from the explicit
/// arguments.
///
/// Fails closed: missing credentials are logged and yield `false` without
/// any network activity.
pub fn send_report(
    to: &str,
    subject: &str,
    body: &str,
    sender: Option<String>,
    password: Option<String>,
) -> bool {
    let Some(mailer) = Mailer::resolve(sender, password) else {
        error!("Credenciais de e-mail não fornecidas.");
        return false;
    };
    mailer.send(to, subject, body)
}

/// Renders the HTML part: each non-blank trimmed line of `body` becomes a
/// list item inside the styled container, with `subject` as the heading.
fn html_body(subject: &str, body: &str) -> String {
    let items: String = body
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("<li>{line}</li>"))
        .collect();
    format!(
        r#"<html>
  <body style="font-family: Arial, sans-serif; line-height: 1.6;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px; border: 1px solid #ddd;">
      <h2 style="color: #333; text-align: center;">{subject}</h2>
      <div style="background: #f9f9f9; padding: 15px; border-radius: 5px;">
        <ul>{items}</ul>
      </div>
      <p style="text-align: center; color: #666; margin-top: 20px;">
        Relatório gerado automaticamente • Sistema de Automação
      </p>
    </div>
  </body>
</html>"#
    )
}
