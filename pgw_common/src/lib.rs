mod helpers;
mod payment_status;
mod secret;

pub mod serde_helpers;

pub use helpers::{parse_boolean_flag, parse_env_flag};
pub use payment_status::PaymentStatus;
pub use secret::Secret;
