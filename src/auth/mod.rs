pub mod auth;
pub mod card;
pub mod handlers;
pub mod jwt;
pub mod session;
