pub mod audit;
pub mod notification;
pub mod request;
pub mod shift;
pub mod user;

// Re-export all repositories for easy importing
pub use audit::AuditRepository;
pub use notification::NotificationRepository;
pub use request::RequestRepository;
pub use shift::ShiftRepository;
pub use user::UserRepository;
