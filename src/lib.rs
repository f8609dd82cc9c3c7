//! Comment threads, forum, moderation queue and checkout for the recipe blog,
//! plus the client-side pieces that talk to them.

pub mod checkout;
pub mod client;
pub mod comment;
pub mod database;
pub mod forum;
pub mod identity;
pub mod middleware;
pub mod moderation;
pub mod router;
pub mod utils;
