use crate::domain::{OrderId, OrderStatus};

/// Core error type.
///
/// Adapter crates map their specific errors into this type so the bot core can
/// handle failures consistently (re-prompt vs reset-to-menu vs staff alert).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("order {0:?} not found")]
    OrderNotFound(OrderId),

    #[error("order {order:?} already finalized ({status:?})")]
    AlreadyFinalized { order: OrderId, status: OrderStatus },

    #[error("transition {from:?} -> {to:?} is not allowed")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("access denied")]
    AccessDenied,

    #[error("delivery error: {0}")]
    Delivery(String),
}

pub type Result<T> = std::result::Result<T, Error>;
