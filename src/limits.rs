//! Hard bounds that keep a single misbehaving caller from degrading the
//! whole engine. Exceeding any of these is `EngineError::LimitExceeded`.

use crate::model::{DAY_MS, Ms};

/// Reject timestamps before the epoch.
pub const MIN_VALID_TIMESTAMP_MS: Ms = 0;

/// Reject timestamps after 2100-01-01.
pub const MAX_VALID_TIMESTAMP_MS: Ms = 4_102_444_800_000;

/// No single reservation may span more than a week.
pub const MAX_SPAN_DURATION_MS: Ms = 7 * DAY_MS;

/// Availability queries are bounded to roughly a quarter.
pub const MAX_QUERY_WINDOW_MS: Ms = 92 * DAY_MS;

/// Cap on blocking reservations held by one resource.
pub const MAX_BLOCKING_PER_RESOURCE: usize = 10_000;

/// Cap on resource name length.
pub const MAX_NAME_LEN: usize = 256;
