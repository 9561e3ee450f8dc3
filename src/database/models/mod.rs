pub mod audit;
pub mod notification;
pub mod request;
pub mod shift;
pub mod user;

// Re-export all models for easy importing
pub use audit::*;
pub use notification::*;
pub use request::*;
pub use shift::*;
pub use user::*;
