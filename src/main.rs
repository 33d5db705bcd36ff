use clap::Parser;
use product_import::utils::{logger, validation::Validate};
use product_import::{
    CliConfig, DispatchBackend, FileImporter, ImportConfig, ImportError, LocalStorage,
    SpreadsheetService, StoreBackend,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    match config.log_format() {
        Some("json") => logger::init_json_logger(cli.verbose, config.log_level()),
        _ => logger::init_cli_logger(cli.verbose, config.log_level()),
    }

    tracing::info!("Starting product-import");
    tracing::debug!("CLI args: {:?}", cli);
    tracing::debug!("Resolved config: {:?}", config);

    if let Err(e) = cli.validate().and_then(|_| config.validate()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    if let Err(e) = run(&cli, &config).await {
        tracing::error!(
            "❌ Import failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        exit_with(&e);
    }
}

async fn run(cli: &CliConfig, config: &ImportConfig) -> product_import::Result<()> {
    let importer = FileImporter::new(LocalStorage::new(config.source.base_path.clone()));
    let store = StoreBackend::from_config(&config.store).await?;
    let dispatcher = DispatchBackend::from_config(&config.dispatch)?;
    let service = SpreadsheetService::new(importer, store, dispatcher).with_decoder(config.decoder());

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be created or queued");
        let report = service.preview(&cli.locator).await?;
        println!(
            "🔍 {} rows: {} would be imported, {} invalid, {} duplicate",
            report.rows_read,
            report.rows_read - report.skipped(),
            report.skipped_invalid,
            report.skipped_duplicate
        );
        return Ok(());
    }

    let report = service.import(&cli.locator).await?;
    println!(
        "✅ Imported {} of {} rows ({} invalid, {} duplicate skipped)",
        report.created_count(),
        report.rows_read,
        report.skipped_invalid,
        report.skipped_duplicate
    );
    println!("📦 Store now holds {} products", service.store().count().await);
    Ok(())
}

fn exit_with(e: &ImportError) -> ! {
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}
