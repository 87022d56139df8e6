use std::env;

/// Channel that receives liveness announcements.
pub const HEALTH_CHECK_CHANNEL: &str = "skynet-portal-health-check";
/// Guild whose roles back the role lookup helper.
pub const PORTAL_GUILD: &str = "Nebulous";
/// Display name used when `PORTAL_NAME` is not configured.
pub const DEFAULT_PORTAL_NAME: &str = "PORTAL_NAME not defined";

#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub discord: DiscordConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone)]
pub struct DiscordConfig {
    /// Bot credential. `None` disables the integration entirely.
    pub bot_token: Option<String>,
    pub portal_name: String,
    pub guild: String,
    pub health_check_channel: String,
    pub proxy: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub port: Option<u16>,
}

/// Loads the notifier config from the process environment.
///
/// Unlike most of the portal's services this integration is configured
/// purely via environment variables, and every variable is optional: a
/// missing token is the supported "integration disabled" mode, not an
/// error.
pub fn load_config() -> PortalConfig {
    PortalConfig {
        discord: DiscordConfig {
            bot_token: non_empty_var("DISCORD_BOT_TOKEN"),
            portal_name: non_empty_var("PORTAL_NAME")
                .unwrap_or_else(|| DEFAULT_PORTAL_NAME.to_owned()),
            guild: PORTAL_GUILD.to_owned(),
            health_check_channel: HEALTH_CHECK_CHANNEL.to_owned(),
            proxy: non_empty_var("DISCORD_PROXY"),
        },
        metrics: MetricsConfig {
            port: non_empty_var("HEALTH_CHECK_METRICS_PORT").and_then(|port| port.parse().ok()),
        },
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}
