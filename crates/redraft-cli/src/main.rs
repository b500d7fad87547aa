mod cli;

use redraft_core::transport::TransportError;

fn main() {
    if let Err(e) = cli::run() {
        // Session expiry is already reported by the notifier; don't repeat it.
        if matches!(
            e.downcast_ref::<TransportError>(),
            Some(TransportError::SessionExpired)
        ) {
            std::process::exit(1);
        }
        eprintln!("{e:#}"); // pretty anyhow chain
        std::process::exit(1);
    }
}
