use anyhow::Result;
use clap::Parser;
use pg_core::config::{PipelineConfig, load_config};

pub mod batch;
pub mod cli;
pub mod pipeline;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Valider la source
    cli.validate_source()?;

    // 4. Charger la config, puis les overrides CLI
    let mut config = resolve_config(&cli)?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    log::debug!("Config : {config:?}");

    let out_dir = cli.out_dir.as_deref();

    // 5. Lot ou image unique
    if let Some(folder) = cli.batch.as_deref() {
        let report = batch::run_batch(folder, out_dir, &config)?;
        for paths in &report.written {
            print_outputs(paths);
        }
        if report.failed > 0 {
            anyhow::bail!(
                "{} image(s) en échec sur {}",
                report.failed,
                report.failed + report.written.len()
            );
        }
        return Ok(());
    }

    if let Some(input) = cli.input.as_deref() {
        let paths = pipeline::process_file(input, out_dir, &config)?;
        print_outputs(&paths);
    }
    Ok(())
}

fn print_outputs(paths: &pipeline::OutputPaths) {
    if let Some(ref image) = paths.image {
        println!("Pixelated image saved as {}", image.display());
    }
    println!("Color data saved as {}", paths.colors.display());
}

/// Fichier de config s'il existe, sinon les défauts.
fn resolve_config(cli: &cli::Cli) -> Result<PipelineConfig> {
    if cli.config.exists() {
        load_config(&cli.config)
    } else {
        log::info!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Ok(PipelineConfig::default())
    }
}
