//! In-flight marker keyed by the authorization code value.
//!
//! Spotify codes are single-use, so a browser reload that replays the callback
//! while the first exchange is still running would only burn the code twice. The
//! first caller holds an [`InFlightCode`] for the duration of its exchange; any
//! concurrent caller presenting the same code is refused before reaching Spotify.

use std::time::{Duration, Instant};

use dashmap::{DashMap, Entry};
use thiserror::Error;

/// Markers older than this are considered abandoned and can be taken over.
pub const DEFAULT_IN_FLIGHT_TTL: Duration = Duration::from_secs(60);

/// Another request is already exchanging this code.
#[derive(Debug, Error)]
#[error("authorization code is already being exchanged")]
pub struct CodeInFlight;

/// Registry of codes currently being exchanged.
pub struct CallbackGuard {
    in_flight: DashMap<String, Instant>,
    ttl: Duration,
}

impl Default for CallbackGuard {
    fn default() -> Self {
        Self::new(DEFAULT_IN_FLIGHT_TTL)
    }
}

impl CallbackGuard {
    /// Guard whose markers are abandoned after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            in_flight: DashMap::new(),
            ttl,
        }
    }

    /// Mark `code` as in flight. The marker is released when the returned value drops.
    pub fn begin(&self, code: &str) -> Result<InFlightCode<'_>, CodeInFlight> {
        let started_at = Instant::now();
        match self.in_flight.entry(code.to_owned()) {
            Entry::Occupied(mut entry) => {
                if started_at.duration_since(*entry.get()) < self.ttl {
                    return Err(CodeInFlight);
                }
                entry.insert(started_at);
            }
            Entry::Vacant(entry) => {
                entry.insert(started_at);
            }
        }

        Ok(InFlightCode {
            guard: self,
            code: code.to_owned(),
            started_at,
        })
    }

    #[cfg(test)]
    pub(crate) fn is_in_flight(&self, code: &str) -> bool {
        self.in_flight
            .get(code)
            .is_some_and(|started_at| started_at.elapsed() < self.ttl)
    }
}

/// Scoped marker for one exchange attempt.
pub struct InFlightCode<'a> {
    guard: &'a CallbackGuard,
    code: String,
    started_at: Instant,
}

impl Drop for InFlightCode<'_> {
    fn drop(&mut self) {
        // A marker taken over after expiry belongs to the newer attempt.
        self.guard
            .in_flight
            .remove_if(&self.code, |_, started_at| *started_at == self.started_at);
    }
}
