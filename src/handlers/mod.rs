pub mod notifications;
pub mod requests;
pub mod shared;
pub mod shifts;
