pub mod auth;

pub use auth::{AuthenticatedOwner, OwnerAuth};
