use std::{error::Error, process};

use caiso_outlook::{
    config::{RunConfig, Target},
    outlook::{daily::HttpFeedSource, dedup::DuplicateLog, feed::FeedUrls, run},
};
use clap::Parser;
use jiff::Zoned;
use log::info;

/// Downloads CAISO system demand and supply by resource type at 5-minute intervals.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The name of the output file with .csv extension (e.g. filename.csv)
    filename: String,

    /// String input: YYYY-MM-DD
    startdate: String,

    /// String input: YYYY-MM-DD
    enddate: String,

    /// Target data: all, demand, supply
    #[arg(value_enum)]
    target: Target,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // an .env file is optional, it can override the feed urls
    let _ = dotenvy::dotenv();

    let today = Zoned::now().date();
    let config = match RunConfig::new(
        &args.filename,
        &args.startdate,
        &args.enddate,
        args.target,
        today,
    ) {
        Ok(config) => config,
        Err(e) => {
            println!("Error: {}", e);
            process::exit(1);
        }
    };
    let urls = FeedUrls::from_env()?;

    println!("{}", config.summary());
    info!(
        "Downloading {} data from {} to {}",
        config.target(),
        config.start(),
        config.end()
    );

    let log = DuplicateLog::new(".");
    run(&config, &urls, &HttpFeedSource::new(), &log)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_args() {
        let args = Args::try_parse_from([
            "download",
            "out.csv",
            "2024-01-01",
            "2024-01-02",
            "all",
        ])
        .unwrap();
        assert_eq!(args.filename, "out.csv");
        assert_eq!(args.target, Target::All);
    }

    #[test]
    fn reject_unknown_target() {
        let args = Args::try_parse_from([
            "download",
            "out.csv",
            "2024-01-01",
            "2024-01-02",
            "prices",
        ]);
        assert!(args.is_err());
    }

    #[test]
    fn reject_missing_args() {
        assert!(Args::try_parse_from(["download", "out.csv", "2024-01-01"]).is_err());
    }
}
