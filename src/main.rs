// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Context;
use catalog_crawler::application::{CrawlSummary, CrawlUseCase, CrawlerContext};
use catalog_crawler::config::settings::Settings;
use catalog_crawler::infrastructure::metrics;
use catalog_crawler::infrastructure::repositories::whitelist_repo_impl::{
    load_publishers, publisher_for,
};
use catalog_crawler::utils::telemetry;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// 发现、校验并索引各托管平台上的公共代码仓库
#[derive(Parser, Debug)]
#[command(name = "catalog-crawler")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Crawl every publisher listed in the whitelist files
    Crawl {
        /// Whitelist files (YAML lists of publishers)
        #[arg(required = true)]
        whitelists: Vec<PathBuf>,
    },
    /// Crawl a single repository
    One {
        /// Repository URL
        repo_url: String,
        /// Whitelist files used to find the owning publisher
        whitelists: Vec<PathBuf>,
    },
}

/// 主函数
///
/// 初始化日志、配置和指标，构建爬虫上下文后执行子命令
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1. Initialize logging
    telemetry::init_telemetry(cli.log_json);
    info!("Starting catalog-crawler...");

    // 2. Load configuration
    let settings = Settings::new().context("could not load configuration")?;
    info!("Configuration loaded");

    // 3. Metrics
    metrics::init_metrics(&settings.metrics);

    // 4. Data dir, hosting domains, index store
    let context = Arc::new(
        CrawlerContext::connect(settings)
            .await
            .context("could not initialize the crawler")?,
    );
    let use_case = CrawlUseCase::new(context.clone());

    match cli.command {
        Commands::Crawl { whitelists } => {
            let publishers = load_publishers(&whitelists)?;
            let summary = use_case.crawl_publishers(publishers).await?;
            report(&summary);

            if !summary.blacklisted.is_empty() {
                let removed = context.publisher.remove(&summary.blacklisted).await;
                info!("{} blacklisted documents removed", removed);
            }
        }
        Commands::One {
            repo_url,
            whitelists,
        } => {
            let publishers = load_publishers(&whitelists)?;
            let publisher = publisher_for(&publishers, &repo_url);
            if publisher.unknown_ipa && publisher.codice_ipa.is_empty() {
                warn!("No whitelisted publisher claims {}", repo_url);
            }
            let summary = use_case
                .crawl_single_repository(&repo_url, publisher)
                .await?;
            report(&summary);
        }
    }

    Ok(())
}

fn report(summary: &CrawlSummary) {
    let report = &summary.report;
    info!(
        "Done: {} published, {} skipped, {} rejected, {} failed",
        report.published, report.skipped, report.rejected, report.failed
    );
}
