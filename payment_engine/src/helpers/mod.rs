mod webhook_signature;

pub use webhook_signature::{calculate_signature, verify_signature, SignatureScheme, WebhookSignatureError};
