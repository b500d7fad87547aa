//! Core Redraft library (config, session store, authenticated transport,
//! typed backend API client).

pub mod api;
pub mod config;
pub mod session;
pub mod transport;

pub use api::ApiClient;
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
pub use transport::{
    ApiRequest, AuthTransport, Navigator, Notifier, Severity, TransportError,
};
