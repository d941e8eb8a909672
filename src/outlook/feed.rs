// Url templates for the CAISO Today's Outlook history files.
// https://www.caiso.com/todays-outlook

use std::env;
use std::fmt;

use jiff::civil::Date;
use log::info;
use serde::Deserialize;

use crate::config::Target;
use crate::error::OutlookError;

/// Token in the url template replaced by the day in `YYYYMMDD` format.
pub const PLACEHOLDER: &str = "datetime";

const FEED_URLS_JSON: &str = r#"
{
    "demand": "https://www.caiso.com/outlook/SP/History/datetime/demand.csv",
    "supply": "https://www.caiso.com/outlook/SP/History/datetime/fuelsource.csv"
}
"#;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dataset {
    Demand,
    Supply,
}

impl Dataset {
    /// Name of the file where rows with duplicate timestamps get dumped.
    pub fn error_log_filename(&self) -> &'static str {
        match self {
            Dataset::Demand => "demand_error_log.txt",
            Dataset::Supply => "supply_error_log.txt",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dataset::Demand => write!(f, "demand"),
            Dataset::Supply => write!(f, "supply"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedTemplate {
    pub dataset: Dataset,
    pub template: String,
}

impl FeedTemplate {
    pub fn url(&self, date: Date) -> String {
        self.template
            .replacen(PLACEHOLDER, &date.strftime("%Y%m%d").to_string(), 1)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct FeedUrls {
    pub demand: String,
    pub supply: String,
}

impl FeedUrls {
    /// The built-in CAISO urls.
    pub fn caiso() -> Result<FeedUrls, OutlookError> {
        let urls: FeedUrls = serde_json::from_str(FEED_URLS_JSON)
            .map_err(|e| OutlookError::InvalidTemplate(e.to_string()))?;
        urls.checked()
    }

    /// The built-in urls, each one can be replaced with the environment variables
    /// `CAISO_OUTLOOK_DEMAND_URL` and `CAISO_OUTLOOK_SUPPLY_URL`.
    pub fn from_env() -> Result<FeedUrls, OutlookError> {
        FeedUrls::with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<FeedUrls, OutlookError> {
        let mut urls = FeedUrls::caiso()?;
        if let Some(url) = lookup("CAISO_OUTLOOK_DEMAND_URL") {
            info!("Using demand url template {}", url);
            urls.demand = url;
        }
        if let Some(url) = lookup("CAISO_OUTLOOK_SUPPLY_URL") {
            info!("Using supply url template {}", url);
            urls.supply = url;
        }
        urls.checked()
    }

    fn checked(self) -> Result<FeedUrls, OutlookError> {
        for template in [&self.demand, &self.supply] {
            if !template.contains(PLACEHOLDER) {
                return Err(OutlookError::InvalidTemplate(template.clone()));
            }
        }
        Ok(self)
    }

    /// Templates to download for a target.  For `all` supply always comes first.
    pub fn resolve(&self, target: Target) -> Vec<FeedTemplate> {
        let demand = FeedTemplate {
            dataset: Dataset::Demand,
            template: self.demand.clone(),
        };
        let supply = FeedTemplate {
            dataset: Dataset::Supply,
            template: self.supply.clone(),
        };
        match target {
            Target::Demand => vec![demand],
            Target::Supply => vec![supply],
            Target::All => vec![supply, demand],
        }
    }
}
