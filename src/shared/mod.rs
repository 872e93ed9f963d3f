pub mod errors;
pub mod id;
pub mod shutdown;

pub use errors::*;
pub use id::new_id;
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};
