use clap::Parser;
use florida_branch_map::domain::registry;
use florida_branch_map::utils::{logger, validation::Validate};
use florida_branch_map::{build_pipeline, CliConfig, MapConfig, MapEngine};

const RULE: &str = "============================================================";

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    println!("{}", RULE);
    println!("Fortiline Waterworks - Florida Interactive Map Generator");
    println!("{}", RULE);

    let config = match cli.load_map_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };
    if cli.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    if cli.dry_run {
        print_dry_run(&config);
        return;
    }

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let result = match build_pipeline(&config) {
        Ok(pipeline) => MapEngine::new_with_monitoring(pipeline, cli.monitor).run().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(summary) => {
            tracing::info!("✅ Map successfully created: {}", summary.output_path);
            println!();
            println!("{}", RULE);
            println!("✓ Map successfully created: {}", summary.output_path);
            println!("  - {} Florida counties", summary.county_count);
            println!("  - {} Fortiline branches", summary.branch_count);
            if !summary.failed.is_empty() {
                println!("  - {} branches could not be geocoded:", summary.failed.len());
                for failed in &summary.failed {
                    println!("      {} ({})", failed.branch.name, failed.reason);
                }
            }
            println!();
            println!(
                "Open {} in your web browser to view the map!",
                summary.output_path
            );
            println!("{}", RULE);
        }
        Err(e) => {
            tracing::error!(
                "❌ Map generation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!();
            eprintln!("ERROR: {}", e.user_friendly_message());
            eprintln!();
            eprintln!("Troubleshooting tips:");
            eprintln!("1. Ensure you have internet access");
            eprintln!("2. {}", e.recovery_suggestion());
            eprintln!("3. If geocoding fails, you may need to wait and try again");

            std::process::exit(e.exit_code().max(1));
        }
    }
}

fn print_dry_run(config: &MapConfig) {
    tracing::info!("🔍 DRY RUN MODE - No network requests will be made");

    println!("Boundaries: {}", config.boundaries.url);
    println!(
        "Geocoder:   {} (max {} attempts, {}ms between requests)",
        config.geocoding.endpoint, config.geocoding.max_attempts, config.geocoding.request_interval_ms
    );
    println!(
        "Output:     {}",
        std::path::Path::new(&config.output.directory)
            .join(&config.output.filename)
            .display()
    );
    println!("Branches:");
    for branch in registry::florida_branches() {
        println!("  {:<15} {}", branch.name, branch.address);
    }
}
