//! World routing.
//!
//! The remote server's convention for addressing a world is deployment
//! specific. The session records `world` but only a [`WorldRouting`]
//! implementation decides whether it becomes part of the URL.

use std::fmt::Debug;

/// Derives the URL loaded into the embedded surface.
pub trait WorldRouting: Debug + Send + Sync {
    /// Compute the session URL, or `None` if it cannot be derived.
    fn world_url(&self, server_url: &str, world: &str) -> Option<String>;
}

/// Default routing: the trimmed server URL without trailing slashes.
///
/// `world` is accepted and ignored; the user picks the world inside the
/// embedded client, or passes a full world URL as the server URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseUrlRouting;

impl WorldRouting for BaseUrlRouting {
    fn world_url(&self, server_url: &str, _world: &str) -> Option<String> {
        let base = server_url.trim().trim_end_matches('/');
        if base.is_empty() { None } else { Some(base.to_string()) }
    }
}
