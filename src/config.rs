use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use jiff::civil::{date, Date};
use jiff::ToSpan;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::OutlookError;

/// First day the CAISO outlook history is available.
pub const EARLIEST_DATE: Date = date(2018, 4, 10);

/// The outlook feeds are published at a 5 minute interval.
pub const OBSERVATIONS_PER_DAY: usize = 288;

pub const OUTPUT_EXTENSION: &str = ".csv";

lazy_static! {
    static ref YYYY_MM_DD: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Target {
    All,
    Demand,
    Supply,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::All => write!(f, "all"),
            Target::Demand => write!(f, "demand"),
            Target::Supply => write!(f, "supply"),
        }
    }
}

/// A validated download request.  Can only be constructed through [`RunConfig::new`].
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    output_path: PathBuf,
    start: Date,
    end: Date,
    target: Target,
}

impl RunConfig {
    /// Validate the raw command line values.  `today` is the current local date,
    /// the most recent day that can be requested is the day before.
    pub fn new(
        filename: &str,
        start: &str,
        end: &str,
        target: Target,
        today: Date,
    ) -> Result<RunConfig, OutlookError> {
        if !filename.ends_with(OUTPUT_EXTENSION) {
            return Err(OutlookError::InvalidFilename(filename.to_string()));
        }
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        if start > end {
            return Err(OutlookError::RangeInverted { start, end });
        }
        if start < EARLIEST_DATE {
            return Err(OutlookError::RangeTooEarly {
                start,
                earliest: EARLIEST_DATE,
            });
        }
        if end > today.saturating_sub(1.day()) {
            return Err(OutlookError::RangeInFuture { end });
        }
        Ok(RunConfig {
            output_path: PathBuf::from(filename),
            start,
            end,
            target,
        })
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// All the days in the range, start and end inclusive.
    pub fn days(&self) -> impl Iterator<Item = Date> {
        let end = self.end;
        self.start.series(1.day()).take_while(move |day| *day <= end)
    }

    pub fn day_count(&self) -> usize {
        self.days().count()
    }

    pub fn expected_observations(&self) -> usize {
        self.day_count() * OBSERVATIONS_PER_DAY
    }

    /// Where the output file will land, for display only.
    pub fn results_location(&self) -> PathBuf {
        if self.output_path.is_absolute() {
            return self.output_path.clone();
        }
        match env::current_dir() {
            Ok(dir) => dir.join(&self.output_path),
            Err(_) => self.output_path.clone(),
        }
    }

    /// The text printed once before the download starts.
    pub fn summary(&self) -> String {
        format!(
            "Data source: {}\nResults location: {}\nSample begins: {}\nSample ends: {}\nSample length: {} days ({} observations)\nDownloading...",
            self.target,
            self.results_location().display(),
            self.start.strftime("%b %d, %Y"),
            self.end.strftime("%b %d, %Y"),
            self.day_count(),
            self.expected_observations(),
        )
    }
}

fn parse_date(s: &str) -> Result<Date, OutlookError> {
    if !YYYY_MM_DD.is_match(s) {
        return Err(OutlookError::InvalidDate(s.to_string()));
    }
    s.parse::<Date>()
        .map_err(|_| OutlookError::InvalidDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use jiff::civil::date;

    use super::*;

    const TODAY: Date = date(2024, 6, 15);

    fn config(start: &str, end: &str) -> Result<RunConfig, OutlookError> {
        RunConfig::new("out.csv", start, end, Target::All, TODAY)
    }

    #[test]
    fn valid_config() -> Result<(), Box<dyn Error>> {
        let config =
            RunConfig::new("out.csv", "2024-01-01", "2024-01-03", Target::Demand, TODAY)?;
        assert_eq!(config.output_path(), Path::new("out.csv"));
        assert_eq!(config.start(), date(2024, 1, 1));
        assert_eq!(config.end(), date(2024, 1, 3));
        assert_eq!(config.target(), Target::Demand);
        assert_eq!(
            config.days().collect::<Vec<_>>(),
            vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]
        );
        assert_eq!(config.expected_observations(), 3 * 288);
        Ok(())
    }

    #[test]
    fn bad_filename() {
        let res = RunConfig::new("out.xlsx", "2024-01-01", "2024-01-01", Target::All, TODAY);
        assert!(matches!(res, Err(OutlookError::InvalidFilename(_))));
    }

    #[test]
    fn bad_dates() {
        for s in ["2024-1-01", "20240101", "2024-02-30", "01/02/2024", ""] {
            let res = config(s, "2024-03-01");
            assert!(matches!(res, Err(OutlookError::InvalidDate(_))), "{}", s);
        }
        assert!(matches!(
            config("2024-01-01", "2024-13-01"),
            Err(OutlookError::InvalidDate(_))
        ));
    }

    #[test]
    fn inverted_range() {
        assert!(matches!(
            config("2024-01-02", "2024-01-01"),
            Err(OutlookError::RangeInverted { .. })
        ));
    }

    #[test]
    fn earliest_date_boundary() {
        assert!(config("2018-04-10", "2018-04-10").is_ok());
        assert!(matches!(
            config("2018-04-09", "2018-04-10"),
            Err(OutlookError::RangeTooEarly { .. })
        ));
    }

    #[test]
    fn latest_date_boundary() {
        assert!(config("2024-06-01", "2024-06-14").is_ok());
        assert!(matches!(
            config("2024-06-01", "2024-06-15"),
            Err(OutlookError::RangeInFuture { .. })
        ));
    }

    #[test]
    fn single_day_summary() -> Result<(), Box<dyn Error>> {
        let config = RunConfig::new(
            "/tmp/out.csv",
            "2024-01-01",
            "2024-01-01",
            Target::Supply,
            TODAY,
        )?;
        assert_eq!(config.day_count(), 1);
        assert_eq!(
            config.summary(),
            "Data source: supply\nResults location: /tmp/out.csv\nSample begins: Jan 01, 2024\nSample ends: Jan 01, 2024\nSample length: 1 days (288 observations)\nDownloading..."
        );
        Ok(())
    }
}
