//! The chat notifier surface consumed by the rest of the portal.

use crate::{
    cache::{
        model::{CachedGuild, CachedRole},
        InMemoryCache,
    },
    config::DiscordConfig,
    error::CacheNotFound,
    prelude::*,
};
use std::sync::atomic::{AtomicBool, Ordering};
use twilight_model::id::{marker::ChannelMarker, Id};

struct NotifierRef {
    http: Arc<twilight_http::Client>,
    cache: InMemoryCache,
    config: DiscordConfig,
    announced: AtomicBool,
}

/// Best-effort announcer and lookup surface over one Discord connection.
///
/// All lookups read whatever the gateway has delivered into the local
/// cache at call time; they are eventually-consistent snapshots, not
/// guaranteed-fresh reads, and callers must tolerate transient misses
/// while the cache populates.
#[derive(Clone)]
pub struct ChatNotifier(Arc<NotifierRef>);

impl ChatNotifier {
    pub fn new(
        config: DiscordConfig,
        http: Arc<twilight_http::Client>,
        cache: InMemoryCache,
    ) -> Self {
        Self(Arc::new(NotifierRef {
            http,
            cache,
            config,
            announced: AtomicBool::new(false),
        }))
    }

    #[inline(always)]
    pub fn cache(&self) -> &InMemoryCache {
        &self.0.cache
    }

    /// Submits a message to the first cached channel with the given name.
    ///
    /// The send is submit-only: delivery errors are logged from the
    /// sending task, never returned. A channel that is not in the cache is
    /// a logged no-op.
    pub fn send_message(&self, message: impl Into<String>, channel_name: &str) {
        let channel_id = match self.resolve_channel(channel_name) {
            Some(channel_id) => channel_id,
            None => {
                warn!("Channel {} not found!", channel_name);
                return;
            }
        };

        self.submit(channel_id, message.into());
    }

    /// Submits a message to the portal health check channel.
    pub fn send_message_to_health_check_channel(&self, message: impl Into<String>) {
        let channel_name = self.0.config.health_check_channel.clone();
        self.send_message(message, &channel_name);
    }

    /// Finds a cached guild by exact name, or `None` when no such guild
    /// has been delivered to the cache.
    pub fn guild_by_name(&self, guild_name: &str) -> Option<Arc<CachedGuild>> {
        self.0.cache.guild_by_name(guild_name)
    }

    /// Finds a role by exact name within the portal guild.
    ///
    /// Identically named roles in any other guild are ignored. A role that
    /// is not cached is a plain `None` miss; the portal guild itself being
    /// absent from the cache is a [`CacheNotFound::Guild`] error, since the
    /// lookup then has no role collection to scan at all.
    pub fn role_by_name(&self, role_name: &str) -> Result<Option<Arc<CachedRole>>, CacheNotFound> {
        let guild = self
            .0
            .cache
            .guild_by_name(&self.0.config.guild)
            .ok_or_else(|| CacheNotFound::Guild(self.0.config.guild.clone()))?;

        Ok(self.0.cache.guild_role_by_name(guild.id, role_name))
    }

    /// Sends the one-time liveness announcement to the health check
    /// channel. Repeat ready signals (gateway resumes) do not re-announce.
    pub fn announce_ready(&self) {
        if !self.0.announced.swap(true, Ordering::SeqCst) {
            self.send_message_to_health_check_channel(self.ready_message());
        }
    }

    pub fn ready_message(&self) -> String {
        format!("{}: reporting for duty!", self.0.config.portal_name)
    }

    fn resolve_channel(&self, channel_name: &str) -> Option<Id<ChannelMarker>> {
        self.0
            .cache
            .channel_by_name(channel_name)
            .map(|channel| channel.id)
    }

    fn submit(&self, channel_id: Id<ChannelMarker>, message: String) {
        async fn push(
            http: Arc<twilight_http::Client>,
            channel_id: Id<ChannelMarker>,
            message: String,
        ) -> crate::error::Result<()> {
            http.create_message(channel_id).content(&message)?.await?;
            Ok(())
        }

        let http = self.0.http.clone();
        tokio::spawn(async move {
            if let Err(err) = push(http, channel_id, message).await {
                error!("Error while sending message to {}: {}", channel_id, err);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_PORTAL_NAME, HEALTH_CHECK_CHANNEL, PORTAL_GUILD};
    use serde_json::json;
    use twilight_model::gateway::payload::incoming::{ChannelCreate, GuildCreate, RoleCreate};

    fn config() -> DiscordConfig {
        DiscordConfig {
            bot_token: None,
            portal_name: DEFAULT_PORTAL_NAME.to_owned(),
            guild: PORTAL_GUILD.to_owned(),
            health_check_channel: HEALTH_CHECK_CHANNEL.to_owned(),
            proxy: None,
        }
    }

    fn notifier(cache: InMemoryCache) -> ChatNotifier {
        let http = Arc::new(twilight_http::Client::new(String::from("test-token")));
        ChatNotifier::new(config(), http, cache)
    }

    fn guild(id: u64, name: &str) -> GuildCreate {
        GuildCreate(
            serde_json::from_value(json!({
                "afk_channel_id": null,
                "afk_timeout": 300,
                "application_id": null,
                "banner": null,
                "channels": [],
                "default_message_notifications": 0,
                "description": null,
                "discovery_splash": null,
                "emojis": [],
                "explicit_content_filter": 0,
                "features": [],
                "icon": null,
                "id": id.to_string(),
                "joined_at": "2015-04-26T06:26:56.936000+00:00",
                "large": false,
                "member_count": 8,
                "members": [],
                "mfa_level": 0,
                "name": name,
                "nsfw_level": 0,
                "owner_id": "10",
                "preferred_locale": "en-US",
                "premium_progress_bar_enabled": false,
                "premium_subscription_count": 0,
                "premium_tier": 0,
                "presences": [],
                "roles": [],
                "rules_channel_id": null,
                "splash": null,
                "stage_instances": [],
                "stickers": [],
                "system_channel_flags": 0,
                "system_channel_id": null,
                "threads": [],
                "unavailable": false,
                "vanity_url_code": null,
                "verification_level": 0,
                "voice_states": [],
                "widget_channel_id": null,
                "widget_enabled": false,
            }))
            .expect("valid guild payload"),
        )
    }

    fn channel(guild_id: u64, id: u64, name: &str) -> ChannelCreate {
        ChannelCreate(
            serde_json::from_value(json!({
                "guild_id": guild_id.to_string(),
                "id": id.to_string(),
                "name": name,
                "nsfw": false,
                "parent_id": null,
                "permission_overwrites": [],
                "position": 0,
                "rate_limit_per_user": 0,
                "topic": null,
                "type": 0,
            }))
            .expect("valid channel payload"),
        )
    }

    fn admin_role(guild_id: u64, id: u64) -> RoleCreate {
        RoleCreate {
            guild_id: Id::new(guild_id),
            role: serde_json::from_value(json!({
                "color": 0,
                "hoist": false,
                "id": id.to_string(),
                "managed": false,
                "mentionable": false,
                "name": "Admin",
                "permissions": "8",
                "position": 2,
            }))
            .expect("valid role payload"),
        }
    }

    #[test]
    fn test_ready_message_uses_portal_name() {
        let mut config = config();
        config.portal_name = String::from("eu-ger-1");
        let http = Arc::new(twilight_http::Client::new(String::from("test-token")));
        let notifier = ChatNotifier::new(config, http, InMemoryCache::new());
        assert_eq!(notifier.ready_message(), "eu-ger-1: reporting for duty!");
    }

    #[test]
    fn test_ready_message_falls_back_to_literal() {
        let notifier = notifier(InMemoryCache::new());
        assert_eq!(
            notifier.ready_message(),
            "PORTAL_NAME not defined: reporting for duty!"
        );
    }

    #[test]
    fn test_guild_by_name_is_exact() {
        let cache = InMemoryCache::new();
        cache.update(&guild(1, "Nebulous"));
        let notifier = notifier(cache);

        assert!(notifier.guild_by_name("Nebulous").is_some());
        assert!(notifier.guild_by_name("nebulous").is_none());
    }

    #[test]
    fn test_role_by_name_without_portal_guild_is_an_error() {
        let notifier = notifier(InMemoryCache::new());
        let err = notifier.role_by_name("Admin").unwrap_err();
        assert!(matches!(err, CacheNotFound::Guild(name) if name == "Nebulous"));
    }

    #[test]
    fn test_role_by_name_only_reads_the_portal_guild() {
        let cache = InMemoryCache::new();
        cache.update(&guild(1, "Nebulous"));
        cache.update(&guild(5, "Other"));
        cache.update(&admin_role(5, 21));
        let notifier = notifier(cache.clone());

        // An identically named role in another guild must not be returned.
        assert!(notifier.role_by_name("Admin").unwrap().is_none());

        cache.update(&admin_role(1, 20));
        let role = notifier.role_by_name("Admin").unwrap().expect("role cached");
        assert_eq!(role.id, Id::new(20));
    }

    #[test]
    fn test_send_message_to_unknown_channel_is_a_no_op() {
        let notifier = notifier(InMemoryCache::new());
        // Logs the miss and returns without submitting anything.
        notifier.send_message("hi", "nonexistent");
    }

    #[tokio::test]
    async fn test_send_message_resolves_cached_channel() {
        let cache = InMemoryCache::new();
        cache.update(&guild(1, "Nebulous"));
        cache.update(&channel(1, 2, "general"));
        let notifier = notifier(cache);

        assert_eq!(notifier.resolve_channel("general"), Some(Id::new(2)));
        assert_eq!(notifier.resolve_channel("General"), None);
        // Drives the full path through the spawned send; delivery itself
        // is the live gateway's concern.
        notifier.send_message("hi", "general");
    }
}
