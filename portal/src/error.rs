pub use anyhow::Result;
use thiserror::Error as ErrorTrait;

/// A by-name lookup over the local gateway cache that found nothing.
///
/// Most misses in this crate degrade to `None` or a logged no-op. This
/// error only surfaces where a miss leaves an operation with nothing to
/// act on at all, such as a role lookup whose guild never arrived.
#[derive(ErrorTrait, Debug)]
pub enum CacheNotFound {
    #[error("Missing Guild: {}", .0)]
    Guild(String),
    #[error("Missing Channel: {}", .0)]
    Channel(String),
    #[error("Missing Role: {}", .0)]
    Role(String),
}
