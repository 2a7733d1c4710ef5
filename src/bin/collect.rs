//! Collects information about a single city from every external source
//! and prints it as JSON.

use anyhow::{bail, Context};
use clap::Parser;
use destination_unveiler::{
    config::Config,
    init_tracing,
    services::{recommendations::DEFAULT_LANGUAGE, ProfileAggregator, Sources},
};

/// Command-line arguments for the city collector
#[derive(Parser, Debug)]
#[command(name = "collect")]
#[command(about = "Fetch information about a city from external sources")]
struct Args {
    /// City name, exactly as it appears in the dataset
    #[arg(long, required = true, num_args = 1..)]
    cities: Vec<String>,

    /// Language in which information about the city is fetched
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    lang: String,

    /// Skip data organization and print the raw per-source data
    #[arg(long = "only_collect")]
    only_collect: bool,
}

fn single_city(cities: &[String]) -> anyhow::Result<&str> {
    match cities {
        [city] => Ok(city.as_str()),
        _ => bail!("Incorrect number of cities: expected 1, got {}", cities.len()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("destination_unveiler=debug");

    let args = Args::parse();
    let city = single_city(&args.cities)?;

    let config = Config::from_env()?;
    let sources = Sources::from_config(&config).context("Failed to load curated travel links")?;
    let aggregator = ProfileAggregator::new(sources, &config.image_dir, config.source_timeout());

    let output = if args.only_collect {
        let raw = aggregator.collect(city, &args.lang).await;
        serde_json::to_string_pretty(&raw)?
    } else {
        let profile = aggregator.aggregate(city, &args.lang).await?;
        serde_json::to_string_pretty(&profile)?
    };

    println!("{}", output);
    Ok(())
}
