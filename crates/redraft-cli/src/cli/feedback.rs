//! Terminal implementations of the session-expiry collaborators.

use redraft_core::transport::{Navigator, Notifier, Severity};

/// Severity-tagged stderr notifications.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, title: &str, message: &str, severity: Severity) {
        match severity {
            Severity::Destructive => eprintln!("error: {title}: {message}"),
            Severity::Warning => eprintln!("warning: {title}: {message}"),
            Severity::Info => eprintln!("{title}: {message}"),
        }
    }
}

/// A terminal cannot redirect a browser, so surface the login destination
/// (with its returnUrl) and the command to run instead.
pub struct LoginHintNavigator;

impl Navigator for LoginHintNavigator {
    fn navigate(&self, path: &str, params: &[(&str, &str)]) {
        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter().copied())
            .finish();
        let destination = if query.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{query}")
        };
        eprintln!("Run `redraft login` to start a new session (return destination: {destination})");
    }
}
