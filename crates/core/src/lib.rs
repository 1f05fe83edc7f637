pub mod admin;
pub mod auth;
pub mod block;
pub mod contact;
pub mod events;
pub mod media;
pub mod order;
pub mod post;
pub mod store;
