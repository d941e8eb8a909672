use jiff::civil::Date;
use log::info;

use super::daily::{fetch_day, FeedSource};
use super::feed::{Dataset, FeedTemplate};
use super::table::DatasetTable;
use crate::error::OutlookError;

/// Rows collected for each dataset over the whole date range.
#[derive(Debug, Default, PartialEq)]
pub struct Accumulated {
    pub supply: DatasetTable,
    pub demand: DatasetTable,
}

impl Accumulated {
    pub fn get_mut(&mut self, dataset: Dataset) -> &mut DatasetTable {
        match dataset {
            Dataset::Supply => &mut self.supply,
            Dataset::Demand => &mut self.demand,
        }
    }
}

/// Download each day for each feed, in the order the feeds are given.
/// Stops at the first failed download.
pub fn accumulate(
    source: &impl FeedSource,
    feeds: &[FeedTemplate],
    days: impl IntoIterator<Item = Date>,
) -> Result<Accumulated, OutlookError> {
    let mut acc = Accumulated::default();
    for day in days {
        info!("Working on {}", day);
        for feed in feeds {
            let table = fetch_day(source, feed, day)?;
            acc.get_mut(feed.dataset).append(table);
        }
    }
    info!(
        "Collected {} supply rows, {} demand rows",
        acc.supply.len(),
        acc.demand.len()
    );
    Ok(acc)
}
