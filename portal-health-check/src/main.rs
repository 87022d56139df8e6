use futures::stream::StreamExt;
use portal::{
    cache::{InMemoryCache, ResourceType},
    config, init,
    gateway::{Event, EventTypeFlags, Intents},
    models::id::{marker::GuildMarker, Id},
    notifier::ChatNotifier,
    prelude::*,
};
use std::collections::HashSet;

const BOT_INTENTS: Intents = Intents::GUILDS;

const BOT_EVENTS: EventTypeFlags = EventTypeFlags::from_bits_truncate(
    EventTypeFlags::READY.bits()
        | EventTypeFlags::CHANNEL_CREATE.bits()
        | EventTypeFlags::CHANNEL_DELETE.bits()
        | EventTypeFlags::CHANNEL_UPDATE.bits()
        | EventTypeFlags::GUILD_CREATE.bits()
        | EventTypeFlags::GUILD_DELETE.bits()
        | EventTypeFlags::GUILD_UPDATE.bits()
        | EventTypeFlags::ROLE_CREATE.bits()
        | EventTypeFlags::ROLE_DELETE.bits()
        | EventTypeFlags::ROLE_UPDATE.bits()
        | EventTypeFlags::UNAVAILABLE_GUILD.bits(),
);

const CACHED_RESOURCES: ResourceType = ResourceType::from_bits_truncate(
    ResourceType::GUILD.bits() | ResourceType::CHANNEL.bits() | ResourceType::ROLE.bits(),
);

#[tokio::main]
async fn main() {
    let config = config::load_config();
    init::init(&config);

    // A missing token is the supported "integration disabled" mode, not an
    // error: the portal keeps running without chat notifications.
    let token = match config.discord.bot_token.clone() {
        Some(token) => token,
        None => {
            info!("DISCORD_BOT_TOKEN environment variable not available, skipping discord integration");
            return;
        }
    };

    let http_client = Arc::new(init::http_client(&config, token.clone()));
    let cache = InMemoryCache::builder()
        .resource_types(CACHED_RESOURCES)
        .build();

    // A rejected token or unreachable gateway must not take the portal
    // down with it; the integration just stays dark for this process.
    let built = init::cluster(token, BOT_INTENTS)
        .http_client(http_client.clone())
        .event_types(BOT_EVENTS)
        .build()
        .await;
    let (gateway, mut events) = match built {
        Ok(built) => built,
        Err(err) => {
            error!("Could not connect to discord server: {}", err);
            return;
        }
    };
    let gateway = Arc::new(gateway);

    let mut client = Client {
        notifier: ChatNotifier::new(config.discord.clone(), http_client, cache.clone()),
        pending_guilds: HashSet::new(),
    };

    info!("Starting gateway...");
    gateway.up().await;
    info!("Client started.");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => { break; }
            res = events.next() => {
                if let Some((_, evt)) = res {
                    cache.update(&evt);
                    client.consume_event(evt);
                } else {
                    break;
                }
            }
        }
    }

    info!("Shutting down gateway...");
    gateway.down();
    info!("Client stopped.");
}

struct Client {
    notifier: ChatNotifier,
    // Guilds announced in the ready payload that have not arrived yet.
    pending_guilds: HashSet<Id<GuildMarker>>,
}

impl Client {
    fn consume_event(&mut self, event: Event) {
        match event {
            // The ready announcement waits until every guild listed in the
            // ready payload has been delivered, since the health check
            // channel is only findable by name once its guild is cached.
            Event::Ready(evt) => {
                info!("Connected to the Discord gateway as {}.", evt.user.name);
                self.pending_guilds
                    .extend(evt.guilds.iter().map(|guild| guild.id));
                self.announce_if_caught_up();
            }
            Event::GuildCreate(evt) => {
                info!("Guild Available: {}", evt.0.id);
                self.pending_guilds.remove(&evt.0.id);
                self.announce_if_caught_up();
            }
            // A guild that leaves or goes dark instead of arriving must not
            // gate the ready announcement for the life of the process.
            Event::GuildDelete(evt) => {
                if !evt.unavailable {
                    info!("Left guild {}", evt.id);
                }
                self.pending_guilds.remove(&evt.id);
                self.announce_if_caught_up();
            }
            Event::UnavailableGuild(evt) => {
                self.pending_guilds.remove(&evt.id);
                self.announce_if_caught_up();
            }
            _ => {}
        }
    }

    fn announce_if_caught_up(&self) {
        if self.pending_guilds.is_empty() {
            self.notifier.announce_ready();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal::{
        cache::InMemoryCache,
        config::{DiscordConfig, DEFAULT_PORTAL_NAME, HEALTH_CHECK_CHANNEL, PORTAL_GUILD},
        models::gateway::payload::incoming::{GuildDelete, UnavailableGuild},
    };

    fn client() -> Client {
        let config = DiscordConfig {
            bot_token: None,
            portal_name: DEFAULT_PORTAL_NAME.to_owned(),
            guild: PORTAL_GUILD.to_owned(),
            health_check_channel: HEALTH_CHECK_CHANNEL.to_owned(),
            proxy: None,
        };
        let http = Arc::new(portal::http::Client::new(String::from("test-token")));
        Client {
            notifier: ChatNotifier::new(config, http, InMemoryCache::new()),
            pending_guilds: HashSet::new(),
        }
    }

    #[test]
    fn test_guild_leaving_during_startup_unblocks_announcement() {
        let mut client = client();
        client.pending_guilds.insert(Id::new(1));
        client.pending_guilds.insert(Id::new(2));

        client.consume_event(Event::GuildDelete(GuildDelete {
            id: Id::new(1),
            unavailable: false,
        }));
        assert!(!client.pending_guilds.contains(&Id::new(1)));

        client.consume_event(Event::UnavailableGuild(UnavailableGuild { id: Id::new(2) }));
        assert!(client.pending_guilds.is_empty());
    }
}
