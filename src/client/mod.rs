//! Helpers for consumers of the `/spotify` routes.

/// Local mirror of the linked tokens.
pub mod token_cache;

pub use self::token_cache::{CachedTokens, ClientTokenCache};
