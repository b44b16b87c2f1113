pub mod admin;
pub mod auth;
pub mod events;
pub mod health;
pub mod media;
pub mod organizer;
pub mod users;
