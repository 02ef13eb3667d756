pub mod pair_state;
pub mod position;

pub use pair_state::{PairShape, PairState};
pub use position::Position;
