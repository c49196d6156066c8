pub mod comment;
pub mod photo;
pub mod social_media;
pub mod user;

pub use comment::Comment;
pub use photo::Photo;
pub use social_media::SocialMedia;
pub use user::User;
