use twilight_model::{
    channel::ChannelType,
    id::{
        marker::{ChannelMarker, GuildMarker},
        Id,
    },
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CachedChannel {
    pub id: Id<ChannelMarker>,
    pub guild_id: Id<GuildMarker>,
    pub kind: ChannelType,
    pub name: Box<str>,
}
