use clap::Parser;
use partsum::cli::commands::{init, run};
use partsum::cli::{Cli, Commands};
use partsum::io::ExitCode;
use partsum::{Settings, logging};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => match Settings::load_from(path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Configuration error in {}: {e}", path.display());
                return ExitCode::ConfigError.into();
            }
        },
        None => Settings::load().unwrap_or_else(|e| {
            eprintln!("Configuration error: {e}");
            if Settings::workspace_root().is_some()
                && let Err(reason) = Settings::check_init()
            {
                eprintln!("{reason}");
            }
            eprintln!("Using default configuration for now.");
            Settings::default()
        }),
    };

    logging::init_with_config(&settings.logging);

    let code = match cli.command {
        Commands::Init { force } => match std::env::current_dir() {
            Ok(root) => init::run_init(&root, force),
            Err(e) => {
                eprintln!("Error: cannot determine current directory: {e}");
                ExitCode::GeneralError
            }
        },
        Commands::Config => init::run_config(&settings),
        command @ Commands::Run { .. } => match command.into_run_args() {
            Some(args) => run::run(args, &settings),
            None => ExitCode::GeneralError,
        },
    };

    code.into()
}
