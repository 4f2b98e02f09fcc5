pub mod errors;
pub mod id;
pub mod session;

pub use errors::{NimbusError, RealtimeError};
pub use id::new_id;
pub use session::SessionSlot;
