//! Data models for the application
//!
//! Wire types exchanged with the course-management backend, organized by
//! domain. The backend speaks camelCase JSON.

mod auth;
mod course;
mod material;
mod role;
mod user;

// Re-export all models for convenient imports
pub use auth::*;
pub use course::*;
pub use material::*;
pub use role::*;
pub use user::*;
