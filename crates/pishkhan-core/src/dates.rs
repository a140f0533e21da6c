//! Date range generation for the crawl.

use crate::calendar::SolarDate;
use crate::error::CrawlError;

/// Every date from `start` to `end` inclusive, ascending, no gaps.
///
/// Fails with [`CrawlError::InvalidRange`] when `end` precedes `start`.
pub fn date_range(start: SolarDate, end: SolarDate) -> Result<Vec<SolarDate>, CrawlError> {
    let first = start.day_number();
    let last = end.day_number();
    if last < first {
        return Err(CrawlError::InvalidRange { start, end });
    }
    Ok((first..=last).map(SolarDate::from_day_number).collect())
}
