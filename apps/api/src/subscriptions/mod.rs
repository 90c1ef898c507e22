//! Plans, subscription lifecycle, and billing confirmation.

pub mod handlers;
pub mod lifecycle;
