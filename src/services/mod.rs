pub mod authorization;
pub mod replacements;
pub mod requests;
pub mod shifts;
pub mod week;

pub use authorization::{authorize, Action, Actor};
pub use replacements::ReplacementService;
pub use requests::RequestService;
pub use shifts::ShiftService;
pub use week::{DayBucket, WeekView};
