//! Hard per-session ceilings on expensive retrieval.
//!
//! Each [`QuotaResource`] has a fixed limit and a consumed counter.
//! Callers first [`QuotaGuard::try_reserve`] the count they intend to
//! retrieve, do the work, then [`QuotaGuard::commit`] the count that
//! actually succeeded. A rejected reservation consumes nothing.
//!
//! The guard belongs to one analysis session and is shared by handle
//! (`Arc<QuotaGuard>`); the counters live behind a single mutex.
//! Retrievals within a session run one at a time, so reserve and
//! commit are separate calls rather than one atomic operation.

use std::sync::Mutex;

/// Default ceiling on page-image retrievals per session.
pub const PAGE_IMAGE_LIMIT: u32 = 50;

/// Default ceiling on external page fetches per session.
pub const WEB_FETCH_LIMIT: u32 = 20;

/// A retrieval category with its own independent ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuotaResource {
    /// Full page images from the corpus.
    PageImages,
    /// Pages fetched from the public web.
    WebFetch,
}

/// Why a reservation was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuotaError {
    /// The ceiling has already been reached; nothing more can be
    /// reserved this session.
    #[error("quota limit of {limit} already reached")]
    AtLimit { limit: u32 },
    /// The request is larger than what is left.
    #[error("{requested} requested but only {remaining} remaining")]
    WouldExceed { requested: u32, remaining: u32 },
}

#[derive(Debug, Clone, Copy)]
struct Ledger {
    limit: u32,
    consumed: u32,
}

impl Ledger {
    fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.consumed)
    }
}

#[derive(Debug)]
struct Ledgers {
    page_images: Ledger,
    web_fetch: Ledger,
}

impl Ledgers {
    fn get(&self, resource: QuotaResource) -> &Ledger {
        match resource {
            QuotaResource::PageImages => &self.page_images,
            QuotaResource::WebFetch => &self.web_fetch,
        }
    }

    fn get_mut(&mut self, resource: QuotaResource) -> &mut Ledger {
        match resource {
            QuotaResource::PageImages => &mut self.page_images,
            QuotaResource::WebFetch => &mut self.web_fetch,
        }
    }
}

/// Session-scoped quota counters.
pub struct QuotaGuard {
    ledgers: Mutex<Ledgers>,
}

impl QuotaGuard {
    /// New guard with the default limits.
    pub fn new() -> Self {
        Self {
            ledgers: Mutex::new(Ledgers {
                page_images: Ledger {
                    limit: PAGE_IMAGE_LIMIT,
                    consumed: 0,
                },
                web_fetch: Ledger {
                    limit: WEB_FETCH_LIMIT,
                    consumed: 0,
                },
            }),
        }
    }

    /// Override one resource's limit. Intended for configuration at
    /// session construction, before any retrieval has happened.
    pub fn with_limit(self, resource: QuotaResource, limit: u32) -> Self {
        self.ledgers.lock().unwrap().get_mut(resource).limit = limit;
        self
    }

    /// Check that `requested` more retrievals fit under the ceiling.
    ///
    /// Pure precondition check: nothing is charged here, so a refused
    /// request costs the session nothing. Returns the remaining
    /// allowance on success.
    pub fn try_reserve(&self, resource: QuotaResource, requested: u32) -> Result<u32, QuotaError> {
        let ledgers = self.ledgers.lock().unwrap();
        let ledger = ledgers.get(resource);
        if ledger.consumed >= ledger.limit {
            return Err(QuotaError::AtLimit {
                limit: ledger.limit,
            });
        }
        let remaining = ledger.remaining();
        if requested > remaining {
            return Err(QuotaError::WouldExceed {
                requested,
                remaining,
            });
        }
        Ok(remaining)
    }

    /// Charge `succeeded` retrievals and return the new remaining
    /// allowance.
    ///
    /// Callers reserve before committing, with a count at least as
    /// large as what they commit, so `consumed` stays within `limit`.
    pub fn commit(&self, resource: QuotaResource, succeeded: u32) -> u32 {
        let mut ledgers = self.ledgers.lock().unwrap();
        let ledger = ledgers.get_mut(resource);
        ledger.consumed += succeeded;
        ledger.remaining()
    }

    pub fn limit(&self, resource: QuotaResource) -> u32 {
        self.ledgers.lock().unwrap().get(resource).limit
    }

    pub fn consumed(&self, resource: QuotaResource) -> u32 {
        self.ledgers.lock().unwrap().get(resource).consumed
    }

    pub fn remaining(&self, resource: QuotaResource) -> u32 {
        self.ledgers.lock().unwrap().get(resource).remaining()
    }
}

impl Default for QuotaGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_guard_has_full_allowance() {
        let guard = QuotaGuard::new();
        assert_eq!(guard.remaining(QuotaResource::PageImages), PAGE_IMAGE_LIMIT);
        assert_eq!(guard.remaining(QuotaResource::WebFetch), WEB_FETCH_LIMIT);
        assert_eq!(guard.consumed(QuotaResource::PageImages), 0);
    }

    #[test]
    fn reserve_does_not_charge() {
        let guard = QuotaGuard::new();
        assert_eq!(guard.try_reserve(QuotaResource::PageImages, 10), Ok(50));
        assert_eq!(guard.consumed(QuotaResource::PageImages), 0);
    }

    #[test]
    fn rejected_reserve_is_free() {
        let guard = QuotaGuard::new().with_limit(QuotaResource::PageImages, 5);
        guard.commit(QuotaResource::PageImages, 3);

        let err = guard.try_reserve(QuotaResource::PageImages, 5).unwrap_err();
        assert_eq!(
            err,
            QuotaError::WouldExceed {
                requested: 5,
                remaining: 2
            }
        );
        assert_eq!(guard.consumed(QuotaResource::PageImages), 3);
    }

    #[test]
    fn at_limit_once_allowance_is_spent() {
        let guard = QuotaGuard::new().with_limit(QuotaResource::PageImages, 50);
        guard.commit(QuotaResource::PageImages, 48);

        // 48 + 2 fits exactly.
        assert_eq!(guard.try_reserve(QuotaResource::PageImages, 2), Ok(2));
        guard.commit(QuotaResource::PageImages, 2);
        assert_eq!(guard.consumed(QuotaResource::PageImages), 50);

        // Any further request hits the limit, whatever its size.
        assert_eq!(
            guard.try_reserve(QuotaResource::PageImages, 1),
            Err(QuotaError::AtLimit { limit: 50 })
        );
    }

    #[test]
    fn commit_less_than_reserved_under_consumes() {
        let guard = QuotaGuard::new();
        guard.try_reserve(QuotaResource::PageImages, 10).unwrap();
        let remaining = guard.commit(QuotaResource::PageImages, 7);
        assert_eq!(remaining, 43);
        assert_eq!(guard.consumed(QuotaResource::PageImages), 7);
    }

    #[test]
    fn resources_are_independent() {
        let guard = QuotaGuard::new().with_limit(QuotaResource::PageImages, 1);
        guard.commit(QuotaResource::PageImages, 1);

        assert!(guard.try_reserve(QuotaResource::PageImages, 1).is_err());
        assert_eq!(
            guard.try_reserve(QuotaResource::WebFetch, 1),
            Ok(WEB_FETCH_LIMIT)
        );
    }
}
