//! `dmconvert`: converts a legacy Turtle export into the document store.

use clap::Parser;
use dmconvert_core::{
    init_logging, open_db, ConfigFile, ConvertConfig, ConvertOptions, ConvertService,
    SqliteGraphStore,
};
use log::{error, info};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "dmconvert", version, about = "Convert a legacy Turtle export into the document store")]
struct Args {
    /// Turtle file to convert.
    input: Option<PathBuf>,

    /// SQLite store file.
    #[arg(long = "db")]
    db_path: Option<PathBuf>,

    /// Directory for the rotating log file.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// trace, debug, info, warn or error.
    #[arg(long)]
    log_level: Option<String>,

    /// TOML file with default settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write the converted graph as JSON.
    #[arg(long = "export-json")]
    export_path: Option<PathBuf>,

    /// Skip project membership propagation and pruning.
    #[arg(long)]
    no_project_linking: bool,
}

impl Args {
    fn overrides(&self) -> ConfigFile {
        ConfigFile {
            input: self.input.clone(),
            db_path: self.db_path.clone(),
            log_dir: self.log_dir.clone(),
            log_level: self.log_level.clone(),
            link_projects: self.no_project_linking.then_some(false),
            export_path: self.export_path.clone(),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("dmconvert: {err}");
            return ExitCode::FAILURE;
        }
    };

    let log_dir = config.log_dir.to_string_lossy().into_owned();
    if let Err(err) = init_logging(&config.log_level, &log_dir) {
        eprintln!("dmconvert: cannot start logging: {err}");
        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={}", chain(err.as_ref()));
            log::logger().flush();
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<ConvertConfig, Box<dyn Error>> {
    let file = match &args.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    Ok(file.merge(args.overrides()).into_config()?)
}

fn run(config: &ConvertConfig) -> Result<(), Box<dyn Error>> {
    let conn = open_db(&config.db_path)?;
    let service = ConvertService::new(
        SqliteGraphStore::new(&conn),
        ConvertOptions {
            link_projects: config.link_projects,
            export_path: config.export_path.clone(),
        },
    );
    let report = service.run_file(&config.input)?;

    info!(
        "event=cli_exit module=cli status=ok run_id={} users={} projects={} documents={} images={} highlights={} links={} misses={}",
        report.run_id,
        report.persisted.users,
        report.persisted.projects,
        report.persisted.documents,
        report.persisted.images,
        report.persisted.highlights,
        report.persisted.links,
        report.classify.misses
    );
    log::logger().flush();
    Ok(())
}

/// Error message followed by its sources, separated by `: `.
///
/// Sources already spelled out by their wrapper are skipped.
fn chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
