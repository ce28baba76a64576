pub mod models;
pub mod password;
pub mod repository;

pub use models::{NewUser, UserModel};
pub use repository::{InMemoryUserRepository, SqliteUserRepository, UserRepository};
