//! Re-exports of the Discord model types used across the portal.

pub use twilight_model::channel;
pub use twilight_model::gateway;
pub use twilight_model::guild;
pub use twilight_model::id;
pub use twilight_model::user;
pub use twilight_model::util;
