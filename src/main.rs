// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::Context;
use std::env;
use std::sync::Arc;
use std::time::Instant;

use spacejar::config::load_and_validate_config;
use spacejar::observability::init_tracing;
use spacejar::pipeline::{PipelineOrchestrator, PipelineReport};
use spacejar::scoring::InMemoryScoringRuntime;
use spacejar::warehouse::{InMemoryWarehouse, WarehouseFixture};

#[tokio::main]
async fn main() {
    init_tracing("info");

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <pipeline.yaml> <warehouse-fixture.yaml>", args[0]);
        eprintln!(
            "Example: {} configs/pipeline.yaml configs/warehouse-fixture.yaml",
            args[0]
        );
        std::process::exit(1);
    }

    if let Err(e) = run(&args[1], &args[2]).await {
        eprintln!("❌ Pipeline failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(config_file: &str, fixture_file: &str) -> anyhow::Result<()> {
    let start_time = Instant::now();

    let config = load_and_validate_config(config_file)
        .with_context(|| format!("loading {}", config_file))?;
    let fixture = WarehouseFixture::load(fixture_file)
        .with_context(|| format!("loading {}", fixture_file))?;

    let runtime = match config.encryption_key_bytes()? {
        Some(key) => InMemoryScoringRuntime::with_key(&key),
        None => InMemoryScoringRuntime::new(),
    };
    let mut pipeline = PipelineOrchestrator::from_config(
        &config,
        Arc::new(InMemoryWarehouse::new(fixture)),
        Arc::new(runtime),
    )?;

    let settings = pipeline.settings();
    println!("🚀 Dominance Subscore Pipeline");
    println!("═══════════════════════════════");
    println!("📋 Configuration: {}", config_file);
    println!("🗄️  Warehouse fixture: {}", fixture_file);
    println!("🔗 Chains: {}", settings.chain_count);
    println!("💱 Quote in USD: {}", settings.quote_in_usd);
    println!(
        "🏷️  Subscore: {} ({:?} on re-registration)",
        settings.subscore_name, settings.policy
    );

    let report = pipeline.run().await?;
    print_report(&report);

    println!(
        "\n⏱️  Total Time (including config load): {:?}",
        start_time.elapsed()
    );
    Ok(())
}

fn print_report(report: &PipelineReport) {
    println!("\n📊 Run Results:");
    println!("⏱️  Pipeline Time: {:?}", report.duration);
    println!("🔢 Rows Forwarded: {}", report.rows_forwarded);

    println!("\n🔄 Sources:");
    for (i, source) in report.sources.iter().enumerate() {
        println!(
            "  {}. {} → {} assets, {} rows",
            i + 1,
            source.chain,
            source.assets,
            source.rows_forwarded
        );
    }

    println!("\n💾 Gigabytes Processed:");
    for (i, gigabytes) in report.gigabytes.iter().enumerate() {
        println!("  query {}: {:.6} GB", i + 1, gigabytes);
    }
    println!("  total:   {:.6} GB", report.total_gigabytes);
}
