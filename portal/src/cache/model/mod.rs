//! Models built for utilizing efficient caching.

mod channel;
mod guild;
mod role;

pub use self::{channel::CachedChannel, guild::CachedGuild, role::CachedRole};
