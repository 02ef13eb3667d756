use thiserror::Error;

/// Errors raised while constructing or transforming domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("invalid tick range: lower {lower} must be below upper {upper}")]
    InvalidRange { lower: i32, upper: i32 },

    #[error("tick {0} is outside the supported range")]
    TickOutOfBounds(i64),

    #[error("tick spacing must be positive, got {0}")]
    InvalidTickSpacing(i32),

    #[error("invalid address {0:?}: expected 0x-prefixed 20-byte hex")]
    InvalidAddress(String),

    #[error("price overflow converting tick {0}")]
    PriceOverflow(i32),
}
