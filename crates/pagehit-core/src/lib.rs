//! Request normalization and bot filtering for privacy-preserving page view analytics.
//!
//! The pipeline is: [`bot::BotFilter`] decides whether a request is worth recording,
//! then [`builder::build_hit`] turns it into a storage-ready [`event::Hit`].

pub mod bot;
pub mod builder;
pub mod config;
pub mod error;
pub mod event;
pub mod normalize;
pub mod referrer;
pub mod request;
pub mod store;
pub mod user_agent;
pub mod visitor;

pub use bot::{BotFilter, BotTokens};
pub use builder::build_hit;
pub use event::{Hit, HitOptions};
pub use request::HitRequest;
pub use store::{MemoryStore, Store};
pub use user_agent::{ClientClassifier, UserAgentInfo, WootheeClassifier};
