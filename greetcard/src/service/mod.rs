pub mod card_service;
pub mod link_service;

pub use card_service::CardService;
pub use link_service::{ShareLink, canonical_query, share_link};
