// src/main.rs
// =============================================================================
// This is the entry point of the print bot.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, or a file with --log-file)
// 3. Build a Bot, preset any cookies, crawl from the seed
// 4. Print a summary (or the JSON report) and exit with a proper code:
//    0 = every worker finished, 1 = some worker failed, 2 = error
// =============================================================================

mod cli;

use std::fs::File;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use env_logger::{Env, Target};
use webbot::{Bot, CrawlReport};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    // clap prints usage and exits non-zero when the seed is missing
    let cli = Cli::parse();

    init_logging(&cli)?;

    let config = cli.bot_config()?;
    let json = cli.json;

    let bot = Bot::with_config(config)?.on_visit(move |page| {
        log::debug!("Visited {}", page.url);
        if !json {
            println!("{}", page.url);
        }
    });

    for (host, cookies) in cli.preset_cookies()? {
        log::debug!("Presetting {} cookie(s) for {}", cookies.len(), host);
        bot.cookies().set_cookies(&host, cookies);
    }

    let report = bot.start_crawl(&cli.seed).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    if report.is_complete() {
        Ok(0)
    } else {
        Ok(1)
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));

    if let Some(path) = &cli.log_file {
        let file = File::create(path)
            .with_context(|| format!("Could not create log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

fn print_summary(report: &CrawlReport) {
    println!();
    println!("📊 Summary for {}:", report.seed);
    println!("   📄 Pages visited: {}", report.pages_visited());
    println!("   🔗 URLs found: {}", report.urls_found());
    println!("   🖼️  Images found: {}", report.images_found());
    println!("   ⚠️  Fetch errors: {}", report.fetch_errors());
    println!("   🤖 Workers: {}", report.workers.len());

    for worker in report.workers.iter().filter(|w| !w.is_ok()) {
        if let Some(error) = &worker.error {
            println!("   ❌ {}", error);
        }
    }
}
