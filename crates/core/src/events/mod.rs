pub mod bus;
pub mod types;

pub use bus::EventBus;
pub use types::{post_tag, BlogEvent, ChangeKind, PostChangeEvent, BLOG_POSTS_TAG};
