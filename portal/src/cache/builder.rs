use super::{
    config::{Config, ResourceType},
    InMemoryCache,
};

/// Configures which resources an [`InMemoryCache`] retains before
/// constructing it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InMemoryCacheBuilder(Config);

impl InMemoryCacheBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the cache to the given resource types. Events for
    /// anything else are dropped on arrival. Defaults to all types.
    pub fn resource_types(mut self, resource_types: ResourceType) -> Self {
        self.0.resource_types = resource_types;

        self
    }

    pub fn build(self) -> InMemoryCache {
        InMemoryCache::new_with_config(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryCacheBuilder;
    use crate::cache::ResourceType;
    use static_assertions::assert_impl_all;
    use std::fmt::Debug;

    assert_impl_all!(InMemoryCacheBuilder: Clone, Debug, Default, Send, Sync);

    #[test]
    fn test_builder_narrows_resource_types() {
        let cache = InMemoryCacheBuilder::new()
            .resource_types(ResourceType::GUILD)
            .build();
        assert_eq!(cache.config().resource_types(), ResourceType::GUILD);
    }
}
