//! Blog posts: the stored record, its inputs, slugs, validation and service.

pub mod input;
pub mod model;
pub mod service;
pub mod slug;
pub mod validate;

pub use input::{PostInput, PostPatch};
pub use model::{Post, PostStatus};
pub use service::{PostService, ServiceError};
pub use slug::{slugify, SlugError};
pub use validate::{validate, FieldError, PostFields, ValidationErrors};
