pub mod action;
pub mod tick_range;

pub use action::{Action, InvalidShape};
pub use tick_range::{Side, TickRange};
