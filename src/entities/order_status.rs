//! Order status enumeration

use serde::{Deserialize, Serialize};

/// Row of `sp_get_order_status()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatus {
    pub order_id: i32,
    pub order_status: String,
}
