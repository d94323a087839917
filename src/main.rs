use anyhow::{Context, Result};
use log2::*;
use site_crawler::config::{self, OutputFormat};
use site_crawler::{Crawler, LinkGraph};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Indicates start time of a project, lazily initialized
pub static START_TIME: once_cell::sync::Lazy<Instant> = once_cell::sync::Lazy::new(Instant::now);

#[tokio::main]
async fn main() -> Result<()> {
    let _ = *START_TIME;
    let cfg = config::Config::new();
    cfg.validate()?;
    let _log2 = stdout()
        .module(true) // include module name
        .module_with_line(true) // include line number from module
        .module_filter(|module| module.starts_with("site_crawler"))
        .compress(false)
        .level(cfg.log_level.to_string())
        .start();

    let crawler = Crawler::new(cfg.crawler_config())?;

    // Ctrl-C stops dispatching new fetches, the partial graph is still written
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, finishing in-flight requests");
                cancel.cancel();
            }
        });
    }

    let graph = match crawler.crawl_with_cancel(&cfg.seed_url, cancel).await {
        Ok(graph) => graph,
        Err(e) => {
            error!("Crawling failed: {}", e);
            return Err(e.into());
        }
    };

    if graph.is_empty() {
        eprintln!("No links found from {}", cfg.seed_url);
    }

    let rendered = render(&graph, cfg.format)?;
    match &cfg.output_file {
        Some(path) => {
            std::fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;
            info!("Link graph written to {:?}", path);
        }
        None => println!("{}", rendered),
    }

    info!("Done in {:?}", START_TIME.elapsed());
    Ok(())
}

fn render(graph: &LinkGraph, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(graph)?,
        OutputFormat::List => graph.all_urls().into_iter().collect::<Vec<_>>().join("\n"),
    })
}
