//! Otter's main application entry point.
//! Handles command-line argument parsing, logger setup, and dispatches to
//! the init scaffolding or the build orchestrator.

use otter::{
    builder,
    cli::{get_args, Cli, Commands},
    config::find_config_file,
    error::{default_error_handler, Result},
    init,
    runtime::RuntimeContext,
};

fn main() {
    let cli = get_args();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    if let Err(err) = run(cli) {
        default_error_handler(err);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => init::run(&std::env::current_dir()?),
        Commands::Build { file } => {
            let ctx = RuntimeContext::from_process()?;
            let config_path = match file {
                Some(path) => path,
                None => find_config_file(&ctx.cwd)?,
            };
            println!("Using configuration file: {}", config_path.display());

            let project_root = ctx.cwd.clone();
            builder::build(&project_root, &config_path, &ctx)?;
            Ok(())
        }
    }
}
