//! Freshness policy, decoupled from the query path: the same query serves a
//! near-immutable base layer and a live value overlay.

use arealis_model::ResponseMode;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheDirectives {
    pub max_age_secs: u64,
    pub stale_while_revalidate_secs: u64,
}

impl CacheDirectives {
    #[must_use]
    pub fn header_value(&self) -> String {
        format!(
            "public, max-age={}, stale-while-revalidate={}",
            self.max_age_secs, self.stale_while_revalidate_secs
        )
    }
}

/// Geometry barely changes: one day fresh, one week stale-tolerant. Values
/// refresh with every ingest: date-pinned requests may be cached briefly
/// (they only change on backfill); open-ended ones must not be.
#[must_use]
pub fn directives_for(mode: ResponseMode, has_date_param: bool) -> CacheDirectives {
    match mode {
        ResponseMode::Geometry => CacheDirectives {
            max_age_secs: 86_400,
            stale_while_revalidate_secs: 604_800,
        },
        ResponseMode::Value if has_date_param => CacheDirectives {
            max_age_secs: 300,
            stale_while_revalidate_secs: 600,
        },
        ResponseMode::Value => CacheDirectives {
            max_age_secs: 0,
            stale_while_revalidate_secs: 60,
        },
    }
}
