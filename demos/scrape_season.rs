use kicker_scraper::{KickerClient, ScraperConfig, SpeedProfile};
use tracing_subscriber::EnvFilter;

/// Scrape all matches of the seasons given on the command line, e.g.
/// `cargo run --example scrape_season -- 2023-24 2024-25`, and write one
/// JSON file per season to `seasons/`.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let seasons: Vec<String> = std::env::args().skip(1).collect();
    if seasons.is_empty() {
        eprintln!("usage: scrape_season <season>... (e.g. 2024-25)");
        std::process::exit(2);
    }

    let config = ScraperConfig::default().with_speed_profile(SpeedProfile::Fast);
    let client = KickerClient::with_config(config).unwrap();

    let report = client
        .run_batch(&seasons, |done, total, status| {
            println!("[{done}/{total}] {status}");
        })
        .await;
    println!("Finished with state {:?}", report.state);

    std::fs::create_dir_all("seasons").unwrap();
    for season in &report.seasons {
        if let Some(e) = &season.discovery_error {
            println!("{}: discovery failed: {e}", season.season_id);
            continue;
        }
        let matches: Vec<_> = season
            .matches
            .iter()
            .filter_map(|r| r.outcome.as_ref().ok())
            .collect();
        println!(
            "{}: {} of {} matches scraped",
            season.season_id,
            matches.len(),
            season.matches.len()
        );
        serde_json::to_writer_pretty(
            std::fs::File::create(format!("seasons/{}.json", season.season_id)).unwrap(),
            &matches,
        )
        .unwrap();
    }

    for (address, error) in report.failures() {
        println!("failed: {address}: {error}");
    }
}
