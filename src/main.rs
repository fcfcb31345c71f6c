use clap::Parser;
use mongo2mysql::core::TableSpec;
use mongo2mysql::utils::{logger, validation::Validate};
use mongo2mysql::{AppConfig, CliArgs, EtlEngine, EtlError, TablePipeline};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting mongo2mysql");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    if let Err(e) = run(args).await {
        tracing::error!(
            "❌ Migration failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }
}

async fn run(args: CliArgs) -> Result<(), EtlError> {
    if !args.config.exists() {
        // Without a config there is nothing to do; show usage.
        if let Err(e) = CliArgs::write_usage(&mut std::io::stdout()) {
            tracing::debug!("Could not print usage: {}", e);
        }
        return Err(EtlError::MissingConfigError {
            field: format!("config file {}", args.config.display()),
        });
    }

    tracing::info!("📁 Loading configuration from: {}", args.config.display());
    let mut config = AppConfig::from_file(&args.config)?;

    if let Some(db) = &args.mysql_db {
        tracing::info!("🔧 mysql.db overridden to: {}", db);
        config.mysql.db = db.clone();
    }

    config.validate()?;
    let tables = config.select_tables(&args.tables)?;
    let pipeline = TablePipeline::new(&config);

    if args.dry_run {
        print_dry_run(&pipeline, &tables);
        return Ok(());
    }

    let engine = EtlEngine::new_with_monitoring(pipeline, args.monitor);
    let reports = engine.run(&tables).await?;

    let total: u64 = reports.iter().map(|r| r.rows).sum();
    tracing::info!("✅ Migrated {} table(s), {} row(s)", reports.len(), total);
    Ok(())
}

fn print_dry_run(pipeline: &TablePipeline, tables: &[TableSpec]) {
    println!("🔍 Dry run: {} table(s)", tables.len());
    for table in tables {
        let (producer, consumer) = pipeline.commands(table);
        println!();
        println!("{} → {}", table.mongo_name, table.mysql_name);
        println!("  columns: {}", table.fields.join(", "));
        println!("  export:  {}", producer);
        println!("  load:    {}", consumer);
    }
}
