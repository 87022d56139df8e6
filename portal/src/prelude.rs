pub use std::sync::Arc;
pub use tracing::{debug, error, info, warn};
