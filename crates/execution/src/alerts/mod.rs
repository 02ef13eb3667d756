//! Alert system.
//!
//! Best-effort outbound notifications:
//! - Alert values with a severity
//! - Console, webhook and fan-out transports
//! - A sink that never lets a transport failure escape

mod alert;
mod notifier;
mod sink;

pub use alert::*;
pub use notifier::*;
pub use sink::*;
