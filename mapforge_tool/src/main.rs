use std::{io, path::PathBuf, sync::Arc};

use clap::Parser;
use color_eyre as ey;
use ey::eyre::Context;
use mapforge_content::{AssetLocator, BuildOrchestrator, BuildRequest, ImageTerrainGenerator, MapRegistry, Selection};
use mapforge_shared::log::{self, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Builds the terrain, thumbnails and manifests of the maps", long_about = None)]
struct CommandLineArguments {
    /// Comma-separated list of the maps to build. All maps are built when omitted.
    ///
    /// Example: --maps=world,eastasia,big_plains
    #[arg(long, default_value = "")]
    maps: Selection,

    /// Directory of the generator. Sources are read from `assets/` below it and the artifacts are
    /// written into `resources/` and `tests/` next to it. Defaults to the current directory.
    #[arg(long)]
    working_dir: Option<PathBuf>,

    /// Maximum level of the log messages
    #[arg(long, default_value = "info")]
    log_level: log::LevelFilter,
}

fn setup_logging(level: log::LevelFilter) -> ey::Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                mapforge_shared::chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(io::stdout())
        .apply()
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    Ok(())
}

fn main() -> ey::Result<()> {
    color_eyre::install()?;
    let command_line_arguments = CommandLineArguments::parse();
    setup_logging(command_line_arguments.log_level)?;

    let locator = match &command_line_arguments.working_dir {
        Some(working_dir) => AssetLocator::new(working_dir),
        None => AssetLocator::from_current_dir(),
    }
    .wrap_err("Failed to resolve the map directories")?;
    info!("Working directory: {}", locator.working_dir().display());

    let orchestrator = BuildOrchestrator::new(MapRegistry::builtin(), locator, Arc::new(ImageTerrainGenerator::default()));
    orchestrator
        .build(&BuildRequest::new(command_line_arguments.maps))
        .wrap_err("Error generating terrain maps")?;

    println!("Terrain maps generated successfully");
    Ok(())
}
