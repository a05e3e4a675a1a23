pub mod endpoints;
pub mod error;
pub mod manager;
pub mod model;
pub mod store;
pub mod transport;

pub use endpoints::Endpoints;
pub use error::SessionError;
pub use manager::{SessionManager, SessionSettings};
pub use model::{Credentials, SessionToken};
pub use store::CredentialStore;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};
