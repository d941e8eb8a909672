use jiff::civil::{Date, DateTime};
use log::{debug, info};
use reqwest::{
    blocking::Client,
    header::{UPGRADE_INSECURE_REQUESTS, USER_AGENT},
    StatusCode,
};

use super::feed::FeedTemplate;
use super::table::{format_time, DatasetTable, Row, TIME_COLUMN};
use crate::error::{FetchCause, OutlookError};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Where the body of a daily file comes from.
pub trait FeedSource {
    fn get(&self, url: &str) -> Result<String, FetchCause>;
}

pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    pub fn new() -> HttpFeedSource {
        HttpFeedSource {
            client: Client::new(),
        }
    }
}

impl Default for HttpFeedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedSource for HttpFeedSource {
    fn get(&self, url: &str) -> Result<String, FetchCause> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(UPGRADE_INSECURE_REQUESTS, "1")
            .send()?;
        if response.status() != StatusCode::OK {
            return Err(FetchCause::Status(response.status()));
        }
        Ok(response.text()?)
    }
}

/// Download the file for one day and parse it.
pub fn fetch_day(
    source: &impl FeedSource,
    feed: &FeedTemplate,
    date: Date,
) -> Result<DatasetTable, OutlookError> {
    let url = feed.url(date);
    info!("Downloading {} data for {} from {}", feed.dataset, date, url);
    source
        .get(&url)
        .and_then(|body| parse_day(&body, date))
        .map_err(|source| OutlookError::FetchFailure { url, source })
}

/// Parse the csv content of a daily file.  The first column is the time of
/// day as `HH:MM`.  Each row gets an absolute timestamp stored in the `Time`
/// column, which is added at the end unless the file already has a column
/// with that name, in which case it is overwritten.
pub fn parse_day(body: &str, date: Date) -> Result<DatasetTable, FetchCause> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(body.as_bytes());
    let mut columns: Vec<String> =
        rdr.headers()?.iter().map(|h| h.to_string()).collect();
    if columns.is_empty() || (columns.len() == 1 && columns[0].is_empty()) {
        return Err(FetchCause::MissingHeader);
    }
    let time_idx = match columns.iter().position(|c| c == TIME_COLUMN) {
        Some(i) => i,
        None => {
            columns.push(TIME_COLUMN.to_string());
            columns.len() - 1
        }
    };

    let mdy = date.strftime("%m/%d/%Y").to_string();
    let mut table = DatasetTable::new(columns);
    for result in rdr.records() {
        let record = result?;
        let hhmm = record.get(0).unwrap_or_default();
        let time = DateTime::strptime("%m/%d/%Y %H:%M", format!("{} {}", mdy, hhmm))
            .map_err(|source| FetchCause::TimeOfDay {
                value: hhmm.to_string(),
                source,
            })?;
        let mut cells: Vec<Option<String>> =
            record.iter().map(|x| Some(x.to_string())).collect();
        if time_idx < cells.len() {
            cells[time_idx] = Some(format_time(&time));
        } else {
            cells.push(Some(format_time(&time)));
        }
        table.rows.push(Row { time, cells });
    }
    debug!("Parsed {} rows for {}", table.len(), date);

    Ok(table)
}
