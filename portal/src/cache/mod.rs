pub mod model;

mod builder;
mod config;
mod updates;

pub use self::{
    builder::InMemoryCacheBuilder,
    config::{Config, ResourceType},
    updates::UpdateCache,
};

use self::model::*;
use dashmap::{mapref::entry::Entry, DashMap, DashSet};
use std::{
    collections::HashSet,
    hash::Hash,
    sync::{Arc, Mutex},
};
use twilight_model::{
    channel::Channel,
    guild::{Guild, PartialGuild, Role},
    id::{
        marker::{ChannelMarker, GuildMarker, RoleMarker},
        Id,
    },
    user::CurrentUser,
};

#[derive(Debug)]
struct GuildItem<T> {
    data: Arc<T>,
    guild_id: Id<GuildMarker>,
}

fn upsert_guild_item<K: Eq + Hash, V: PartialEq>(
    map: &DashMap<K, GuildItem<V>>,
    guild_id: Id<GuildMarker>,
    k: K,
    v: V,
) -> Arc<V> {
    match map.entry(k) {
        Entry::Occupied(e) if *e.get().data == v => Arc::clone(&e.get().data),
        Entry::Occupied(mut e) => {
            let v = Arc::new(v);
            e.insert(GuildItem {
                data: Arc::clone(&v),
                guild_id,
            });

            v
        }
        Entry::Vacant(e) => Arc::clone(
            &e.insert(GuildItem {
                data: Arc::new(v),
                guild_id,
            })
            .data,
        ),
    }
}

// When adding a field here, be sure to add it to `InMemoryCache::clear` if
// necessary.
#[derive(Debug, Default)]
struct InMemoryCacheRef {
    config: Arc<Config>,
    channels: DashMap<Id<ChannelMarker>, GuildItem<CachedChannel>>,
    // So long as the lock isn't held across await or panic points this is fine.
    current_user: Mutex<Option<Arc<CurrentUser>>>,
    guilds: DashMap<Id<GuildMarker>, Arc<CachedGuild>>,
    guild_channels: DashMap<Id<GuildMarker>, HashSet<Id<ChannelMarker>>>,
    guild_roles: DashMap<Id<GuildMarker>, HashSet<Id<RoleMarker>>>,
    roles: DashMap<Id<RoleMarker>, GuildItem<CachedRole>>,
    unavailable_guilds: DashSet<Id<GuildMarker>>,
}

/// A thread-safe, in-process cache of the Discord data this integration
/// reads: guilds, their channels, and their roles.
///
/// The cache is owned and updated solely by the gateway's event stream;
/// every read is a snapshot of whatever the gateway has delivered so far.
/// There is no refresh or consistency guarantee beyond that, so a
/// requested entity that has not arrived yet is simply "not found" and
/// callers must tolerate such transient misses.
///
/// # Cloning
///
/// The cache internally wraps its data within an Arc. This means that the
/// cache can be cloned and passed around tasks and threads cheaply.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCache(Arc<InMemoryCacheRef>);

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn new_with_config(config: Config) -> Self {
        Self(Arc::new(InMemoryCacheRef {
            config: Arc::new(config),
            ..Default::default()
        }))
    }

    /// Create a new builder to configure and construct an in-memory cache.
    pub fn builder() -> InMemoryCacheBuilder {
        InMemoryCacheBuilder::new()
    }

    /// Returns a copy of the config cache.
    pub fn config(&self) -> Config {
        (*self.0.config).clone()
    }

    /// Update the cache with an event from the gateway.
    pub fn update(&self, value: &impl UpdateCache) {
        value.update(self);
    }

    /// Gets a channel by ID.
    ///
    /// This is an O(1) operation. This requires the [`GUILDS`] intent.
    ///
    /// [`GUILDS`]: ::twilight_model::gateway::Intents::GUILDS
    pub fn guild_channel(&self, channel_id: Id<ChannelMarker>) -> Option<Arc<CachedChannel>> {
        self.0
            .channels
            .get(&channel_id)
            .map(|x| Arc::clone(&x.data))
    }

    /// Gets the current user.
    ///
    /// This is an O(1) operation.
    pub fn current_user(&self) -> Option<Arc<CurrentUser>> {
        self.0
            .current_user
            .lock()
            .expect("current user poisoned")
            .clone()
    }

    /// Gets all of the IDs of the guilds in the cache.
    ///
    /// This is an O(n) operation. This requires the [`GUILDS`] intent.
    ///
    /// [`GUILDS`]: ::twilight_model::gateway::Intents::GUILDS
    pub fn guilds(&self) -> Vec<Id<GuildMarker>> {
        self.0.guilds.iter().map(|r| *r.key()).collect()
    }

    /// Gets a guild by ID.
    ///
    /// This is an O(1) operation. This requires the [`GUILDS`] intent.
    ///
    /// [`GUILDS`]: ::twilight_model::gateway::Intents::GUILDS
    pub fn guild(&self, guild_id: Id<GuildMarker>) -> Option<Arc<CachedGuild>> {
        self.0.guilds.get(&guild_id).map(|r| Arc::clone(r.value()))
    }

    /// Gets the set of channels in a guild.
    ///
    /// This is a O(m) operation, where m is the amount of channels in the
    /// guild. This requires the [`GUILDS`] intent.
    ///
    /// [`GUILDS`]: ::twilight_model::gateway::Intents::GUILDS
    pub fn guild_channels(&self, guild_id: Id<GuildMarker>) -> Option<HashSet<Id<ChannelMarker>>> {
        self.0
            .guild_channels
            .get(&guild_id)
            .map(|r| r.value().clone())
    }

    /// Gets the set of roles in a guild.
    ///
    /// This is a O(m) operation, where m is the amount of roles in the guild.
    /// This requires the [`GUILDS`] intent.
    ///
    /// [`GUILDS`]: ::twilight_model::gateway::Intents::GUILDS
    pub fn guild_roles(&self, guild_id: Id<GuildMarker>) -> Option<HashSet<Id<RoleMarker>>> {
        self.0.guild_roles.get(&guild_id).map(|r| r.value().clone())
    }

    /// Gets a role by ID.
    ///
    /// This is an O(1) operation. This requires the [`GUILDS`] intent.
    ///
    /// [`GUILDS`]: ::twilight_model::gateway::Intents::GUILDS
    pub fn role(&self, role_id: Id<RoleMarker>) -> Option<Arc<CachedRole>> {
        self.0
            .roles
            .get(&role_id)
            .map(|role| Arc::clone(&role.data))
    }

    /// Finds the first cached guild with the given name.
    ///
    /// Name comparison is an exact match. This is an O(n) operation over
    /// the cached guilds; the scan order among equally named guilds is
    /// unspecified.
    pub fn guild_by_name(&self, name: &str) -> Option<Arc<CachedGuild>> {
        self.0
            .guilds
            .iter()
            .find(|r| &*r.value().name == name)
            .map(|r| Arc::clone(r.value()))
    }

    /// Finds the first cached channel with the given name, across all
    /// guilds the connection can see.
    ///
    /// Name comparison is an exact match. This is an O(n) operation over
    /// the cached channels; the scan order among equally named channels is
    /// unspecified.
    pub fn channel_by_name(&self, name: &str) -> Option<Arc<CachedChannel>> {
        self.0
            .channels
            .iter()
            .find(|r| &*r.value().data.name == name)
            .map(|r| Arc::clone(&r.value().data))
    }

    /// Finds the first role with the given name within a single guild.
    ///
    /// Name comparison is an exact match; identically named roles in other
    /// guilds are never considered. This is an O(m) operation, where m is
    /// the amount of roles in the guild.
    pub fn guild_role_by_name(
        &self,
        guild_id: Id<GuildMarker>,
        name: &str,
    ) -> Option<Arc<CachedRole>> {
        let role_ids = self.0.guild_roles.get(&guild_id)?;
        role_ids
            .iter()
            .filter_map(|id| self.role(*id))
            .find(|role| &*role.name == name)
    }

    /// Clear the state of the Cache.
    ///
    /// This is equal to creating a new empty cache.
    pub fn clear(&self) {
        self.0.channels.clear();
        self.0
            .current_user
            .lock()
            .expect("current user poisoned")
            .take();
        self.0.guilds.clear();
        self.0.guild_channels.clear();
        self.0.guild_roles.clear();
        self.0.roles.clear();
        self.0.unavailable_guilds.clear();
    }

    fn cache_current_user(&self, current_user: CurrentUser) {
        self.0
            .current_user
            .lock()
            .expect("current user poisoned")
            .replace(Arc::new(current_user));
    }

    fn cache_guild_channels(
        &self,
        guild_id: Id<GuildMarker>,
        channels: impl IntoIterator<Item = Channel>,
    ) {
        for channel in channels {
            self.cache_guild_channel(guild_id, channel);
        }
    }

    fn cache_guild_channel(
        &self,
        guild_id: Id<GuildMarker>,
        channel: Channel,
    ) -> Option<Arc<CachedChannel>> {
        // Unnamed channels (DMs) are of no use to by-name lookups.
        let name = channel.name.as_deref()?;

        self.0
            .guild_channels
            .entry(guild_id)
            .or_default()
            .insert(channel.id);

        let cached = CachedChannel {
            id: channel.id,
            guild_id,
            kind: channel.kind,
            name: name.into(),
        };

        Some(upsert_guild_item(
            &self.0.channels,
            guild_id,
            cached.id,
            cached,
        ))
    }

    fn cache_guild(&self, guild: Guild) {
        // The id sets need to exist first, so caching channels and roles
        // always has a place to put them. On a re-delivery (a guild coming
        // back from unavailable) any entity the new payload no longer
        // carries is purged, or it would linger as a findable stray.
        if self.wants(ResourceType::CHANNEL) {
            let stale = self.0.guild_channels.insert(guild.id, HashSet::new());
            self.cache_guild_channels(guild.id, guild.channels);
            self.cache_guild_channels(guild.id, guild.threads);
            self.purge_stale_channels(guild.id, stale);
        }

        if self.wants(ResourceType::ROLE) {
            let stale = self.0.guild_roles.insert(guild.id, HashSet::new());
            self.cache_roles(guild.id, guild.roles);
            self.purge_stale_roles(guild.id, stale);
        }

        let cached = CachedGuild {
            id: guild.id,
            name: guild.name.into_boxed_str(),
            description: guild.description.map(String::into_boxed_str),
            icon: guild.icon,
            member_count: guild.member_count,
            owner_id: guild.owner_id,
            unavailable: guild.unavailable,
        };

        self.0.unavailable_guilds.remove(&cached.id);
        self.0.guilds.insert(cached.id, Arc::new(cached));
    }

    fn purge_stale_channels(
        &self,
        guild_id: Id<GuildMarker>,
        old: Option<HashSet<Id<ChannelMarker>>>,
    ) {
        if let Some(old) = old {
            let current = self
                .0
                .guild_channels
                .get(&guild_id)
                .map(|r| r.value().clone())
                .unwrap_or_default();
            for channel_id in old.difference(&current) {
                self.0.channels.remove(channel_id);
            }
        }
    }

    fn purge_stale_roles(&self, guild_id: Id<GuildMarker>, old: Option<HashSet<Id<RoleMarker>>>) {
        if let Some(old) = old {
            let current = self
                .0
                .guild_roles
                .get(&guild_id)
                .map(|r| r.value().clone())
                .unwrap_or_default();
            for role_id in old.difference(&current) {
                self.0.roles.remove(role_id);
            }
        }
    }

    fn update_guild(&self, guild: &PartialGuild) {
        if self.wants(ResourceType::ROLE) {
            self.cache_roles(guild.id, guild.roles.iter().cloned());
        }

        if let Some(mut existing) = self.0.guilds.get_mut(&guild.id) {
            let cached = Arc::make_mut(existing.value_mut());
            cached.name = guild.name.clone().into_boxed_str();
            cached.description = guild.description.clone().map(String::into_boxed_str);
            cached.icon = guild.icon;
            cached.member_count = guild.member_count;
            cached.owner_id = guild.owner_id;
        }
    }

    fn cache_roles(&self, guild_id: Id<GuildMarker>, roles: impl IntoIterator<Item = Role>) {
        for role in roles {
            self.cache_role(guild_id, role);
        }
    }

    fn cache_role(&self, guild_id: Id<GuildMarker>, role: Role) -> Arc<CachedRole> {
        self.0
            .guild_roles
            .entry(guild_id)
            .or_default()
            .insert(role.id);

        upsert_guild_item(&self.0.roles, guild_id, role.id, CachedRole::from(&role))
    }

    /// Moves a guild out of the live set without dropping its data; the
    /// guild is expected to come back via a later GuildCreate.
    fn unavailable_guild(&self, guild_id: Id<GuildMarker>) {
        self.0.unavailable_guilds.insert(guild_id);
        self.0.guilds.remove(&guild_id);
    }

    fn delete_guild(&self, guild_id: Id<GuildMarker>) {
        self.0.guilds.remove(&guild_id);
        self.0.unavailable_guilds.remove(&guild_id);

        if let Some((_, channel_ids)) = self.0.guild_channels.remove(&guild_id) {
            for channel_id in channel_ids {
                self.0.channels.remove(&channel_id);
            }
        }

        if let Some((_, role_ids)) = self.0.guild_roles.remove(&guild_id) {
            for role_id in role_ids {
                self.0.roles.remove(&role_id);
            }
        }
    }

    /// Delete a guild channel from the cache.
    ///
    /// The guild channel data itself and the channel entry in its guild's
    /// list of channels will be deleted.
    fn delete_guild_channel(&self, channel_id: Id<ChannelMarker>) -> Option<Arc<CachedChannel>> {
        let GuildItem { data, guild_id } = self.0.channels.remove(&channel_id)?.1;

        if let Some(mut guild_channels) = self.0.guild_channels.get_mut(&guild_id) {
            guild_channels.remove(&channel_id);
        }

        Some(data)
    }

    fn delete_role(&self, role_id: Id<RoleMarker>) -> Option<Arc<CachedRole>> {
        let GuildItem { data, guild_id } = self.0.roles.remove(&role_id)?.1;

        if let Some(mut guild_roles) = self.0.guild_roles.get_mut(&guild_id) {
            guild_roles.remove(&role_id);
        }

        Some(data)
    }

    fn wants(&self, resource_type: ResourceType) -> bool {
        self.0.config.resource_types.contains(resource_type)
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryCache;
    use static_assertions::assert_impl_all;
    use std::fmt::Debug;

    assert_impl_all!(InMemoryCache: Clone, Debug, Default, Send, Sync);
}
