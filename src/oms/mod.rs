//! Order management system
//!
//! Tracks every live order, the net position and unhedged exposure, and
//! enforces the position, outstanding-order and wash-trade constraints.

pub mod manager;
pub mod position;
pub mod types;

pub use manager::OrderManager;
pub use position::PositionBook;
pub use types::{Order, OrderStatus};
