use twilight_model::{
    id::{
        marker::{GuildMarker, UserMarker},
        Id,
    },
    util::ImageHash,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CachedGuild {
    pub id: Id<GuildMarker>,
    pub name: Box<str>,
    pub description: Option<Box<str>>,
    pub icon: Option<ImageHash>,
    pub member_count: Option<u64>,
    pub owner_id: Id<UserMarker>,
    pub unavailable: bool,
}
