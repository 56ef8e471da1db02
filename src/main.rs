use clap::{ArgAction, Parser};
use libris::IdentifierGenerator;
use libris::cli::{self, Command};
use libris::core::config::{self, ResolvedConfig};
use libris::core::library::Library;
use libris::core::store::Store;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "libris", about = "Small-library lending inventory", version)]
struct Args {
    /// Library document to read and write (overrides config and LIBRIS_DATA_FILE)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// More log detail in the log file (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

fn init_logging(resolved: &ResolvedConfig, verbose: u8) {
    let level = match verbose {
        0 => resolved.log_level.parse().unwrap_or(LevelFilter::Info),
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    // stdout belongs to command output, so logs only ever go to the file.
    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(level, log_config, log_file);
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Logging isn't up yet, so config problems go to stderr.
    let file_config = config::load_config().unwrap_or_else(|e| {
        eprintln!("warning: {e}; using defaults");
        Default::default()
    });
    let resolved = config::resolve(&file_config, args.data_file.as_deref());
    init_logging(&resolved, args.verbose);

    log::info!("Libris starting, data file {}", resolved.data_file.display());

    let ids = IdentifierGenerator::new().with_max_attempts(resolved.id_max_attempts);
    let mut library = match Library::open_with(Store::new(&resolved.data_file), ids) {
        Ok(library) => library,
        Err(e) => {
            log::error!("Could not open library: {}", e);
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = cli::run(&mut library, args.command, &resolved, &mut out);
    let _ = out.flush();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_persistence() => {
            log::error!("{}", e);
            eprintln!("error: {e}");
            eprintln!("error: nothing was saved; the library file is as it was before this command");
            ExitCode::FAILURE
        }
        Err(e) => {
            log::warn!("Command failed: {}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
