use clap::Parser;
use pickle_fixture::config::cli::Command;
use pickle_fixture::core::ConfigProvider;
use pickle_fixture::utils::logger;
use pickle_fixture::{
    decode_fixture, to_pretty_json, CliConfig, FixtureEngine, FixturePipeline, LocalStorage,
    Result, StdoutStorage,
};
use std::io::Read;

fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌 (輸出到 stderr)
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting pickle-fixture");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let result = match &cli.command {
        Some(Command::Decode { input }) => decode(input.as_deref()),
        None => generate(&cli),
    };

    if let Err(e) = result {
        tracing::error!(
            "❌ pickle-fixture failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

fn generate(cli: &CliConfig) -> Result<()> {
    let config = cli.resolve()?;

    let output_path = config.output_path().map(str::to_owned);
    match output_path {
        Some(path) => {
            let engine = FixtureEngine::new(FixturePipeline::new(LocalStorage::new(path), config));
            let location = engine.run()?;
            eprintln!("📁 Fixture saved to: {}", location);
        }
        None => {
            let engine = FixtureEngine::new(FixturePipeline::new(StdoutStorage, config));
            engine.run()?;
        }
    }

    Ok(())
}

fn decode(input: Option<&str>) -> Result<()> {
    let text = match input {
        Some(text) => text.to_string(),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let map = decode_fixture(&text)?;
    tracing::info!("✅ Decoded fixture with {} entries", map.len());
    println!("{}", to_pretty_json(&map)?);
    Ok(())
}
