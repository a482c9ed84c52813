mod hmac;
mod panic_guard;

pub use hmac::{HmacMiddlewareFactory, HmacMiddlewareService};
pub use panic_guard::{PanicGuardFactory, PanicGuardService};
