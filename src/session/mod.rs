// Public API - what other modules can use
pub use handlers::{login, logout, register};
pub use middleware::{bearer_token, jwt_auth};
pub use revocation::{InMemoryRevocationRegistry, RevocationRegistry};
pub use service::SessionService;
pub use token::TokenConfig;
pub use types::SessionClaims;

// Internal modules
mod handlers;
mod middleware;
pub mod revocation;
pub mod service;
pub mod token;
pub mod types;
