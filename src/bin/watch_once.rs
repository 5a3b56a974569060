//! One-shot listing: fetch every configured query once and print the ranked view.
//!
//! Usage: `watch_once [limit] [title search...]`

use press_watch::{NewsWatch, ViewFilter, WatchConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let mut args = std::env::args().skip(1);
    let limit = args.next().and_then(|s| s.parse::<usize>().ok());
    let search: Vec<String> = args.collect();
    let filter = ViewFilter {
        title: (!search.is_empty()).then(|| search.join(" ")),
        ..Default::default()
    };

    let watch = NewsWatch::from_config(WatchConfig::load_default()?)?;
    let view = watch.view(limit, &filter).await;

    println!("{} articles (limit {} per query)\n", view.count, view.limit);
    for e in &view.entries {
        println!("{} - {}", e.display_date, e.title);
        if !e.source_name.is_empty() {
            println!("  Source: {}", e.source_name);
        }
        println!("  {}\n", e.link);
    }
    Ok(())
}
