pub mod comments;
pub mod photos;
pub mod social_media;
pub mod users;
