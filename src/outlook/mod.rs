//! Historical data from the CAISO Today's Outlook page: system demand and
//! supply by fuel source, 5 minute intervals, one csv file per day.

pub mod daily;
pub mod dedup;
pub mod feed;
pub mod series;
pub mod table;
pub mod writer;

use log::info;

use crate::config::{RunConfig, Target};
use crate::error::OutlookError;
use daily::FeedSource;
use dedup::{dedup_and_join, DuplicateLog};
use feed::FeedUrls;
use series::accumulate;

/// Download the requested range and write the output file.  Returns the
/// number of rows written.
pub fn run(
    config: &RunConfig,
    urls: &FeedUrls,
    source: &impl FeedSource,
    log: &DuplicateLog,
) -> Result<usize, OutlookError> {
    let feeds = urls.resolve(config.target());
    let acc = accumulate(source, &feeds, config.days())?;

    let count = match config.target() {
        Target::All => {
            let merged = dedup_and_join(acc.demand, acc.supply, log)?;
            writer::write_merged(config.output_path(), &merged)?;
            merged.len()
        }
        Target::Demand => {
            writer::write_table(config.output_path(), &acc.demand)?;
            acc.demand.len()
        }
        Target::Supply => {
            writer::write_table(config.output_path(), &acc.supply)?;
            acc.supply.len()
        }
    };
    info!("Done, {} rows in {}", count, config.output_path().display());
    Ok(count)
}


#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::error::Error;
    use std::fs;

    use jiff::civil::date;
    use jiff::ToSpan;

    use super::testing::{day_file, scratch_dir, StaticFeed};
    use super::*;

    const TODAY: jiff::civil::Date = date(2024, 6, 1);

    #[test]
    fn one_day_of_demand() -> Result<(), Box<dyn Error>> {
        let dir = scratch_dir("one_day_of_demand")?;
        let out = dir.join("demand.csv");
        let config = RunConfig::new(
            out.to_str().unwrap(),
            "2024-01-01",
            "2024-01-01",
            Target::Demand,
            TODAY,
        )?;
        let urls = FeedUrls::caiso()?;
        let mut source = StaticFeed::default();
        source.insert(
            &urls.resolve(Target::Demand)[0].url(date(2024, 1, 1)),
            day_file("Current demand", 288, 20000),
        );
        let n = run(&config, &urls, &source, &DuplicateLog::new(&dir))?;
        assert_eq!(n, 288);

        let mut rdr = csv::Reader::from_path(&out)?;
        assert_eq!(rdr.headers()?, vec!["Time", "Current demand"]);
        let times: Vec<String> = rdr
            .records()
            .map(|r| r.map(|r| r[0].to_string()))
            .collect::<Result<_, _>>()?;
        assert_eq!(times.len(), 288);
        assert_eq!(times.iter().collect::<HashSet<_>>().len(), 288);
        let expected: Vec<String> = date(2024, 1, 1)
            .at(0, 0, 0, 0)
            .series(5.minutes())
            .take(288)
            .map(|t| t.strftime("%Y-%m-%d %H:%M:%S").to_string())
            .collect();
        assert_eq!(times, expected);
        Ok(())
    }

    #[test]
    fn single_target_keeps_repeated_times() -> Result<(), Box<dyn Error>> {
        let dir = scratch_dir("single_target_keeps_repeated_times")?;
        let out = dir.join("supply.csv");
        let config = RunConfig::new(
            out.to_str().unwrap(),
            "2024-01-01",
            "2024-01-01",
            Target::Supply,
            TODAY,
        )?;
        let urls = FeedUrls::caiso()?;
        let mut source = StaticFeed::default();
        source.insert(
            &urls.resolve(Target::Supply)[0].url(date(2024, 1, 1)),
            "Time,Solar\n00:00,1\n00:00,2\n".to_string(),
        );
        let n = run(&config, &urls, &source, &DuplicateLog::new(&dir))?;
        assert_eq!(n, 2);
        assert_eq!(
            fs::read_to_string(&out)?,
            "Time,Solar\n2024-01-01 00:00:00,1\n2024-01-01 00:00:00,2\n"
        );
        assert!(!dir.join("supply_error_log.txt").exists());
        Ok(())
    }

    #[test]
    fn all_with_overlap() -> Result<(), Box<dyn Error>> {
        let dir = scratch_dir("all_with_overlap")?;
        let out = dir.join("all.csv");
        let config = RunConfig::new(
            out.to_str().unwrap(),
            "2024-01-01",
            "2024-01-02",
            Target::All,
            TODAY,
        )?;
        let urls = FeedUrls::caiso()?;
        let feeds = urls.resolve(Target::All);
        let mut source = StaticFeed::default();
        // the Jan 2 supply file republishes the 00:00 interval
        source.insert(
            &feeds[0].url(date(2024, 1, 1)),
            "Time,Solar\n23:55,1\n".to_string(),
        );
        source.insert(
            &feeds[0].url(date(2024, 1, 2)),
            "Time,Solar\n00:00,50\n00:00,99\n00:05,51\n".to_string(),
        );
        source.insert(
            &feeds[1].url(date(2024, 1, 1)),
            "Time,Current demand\n23:55,100\n".to_string(),
        );
        source.insert(
            &feeds[1].url(date(2024, 1, 2)),
            day_file("Current demand", 2, 200),
        );

        let n = run(&config, &urls, &source, &DuplicateLog::new(&dir))?;
        assert_eq!(n, 3);
        assert_eq!(
            fs::read_to_string(&out)?,
            "Time,Current demand,Solar\n\
             2024-01-01 23:55:00,100,1\n\
             2024-01-02 00:00:00,200,50\n\
             2024-01-02 00:05:00,201,51\n"
        );
        let log = fs::read_to_string(dir.join("supply_error_log.txt"))?;
        assert_eq!(log.matches("2024-01-02 00:00:00").count(), 1);
        assert!(log.contains("99"));
        assert!(!dir.join("demand_error_log.txt").exists());
        Ok(())
    }
}
