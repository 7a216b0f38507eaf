use clap::{Parser, Subcommand};
use opavm::commands::*;
use opavm::core::{error::Result, print_error, CommandContext, Tool};
use std::env;
use std::ffi::OsString;

#[derive(Parser)]
#[command(name = "opavm")]
#[command(about = "Per-project version manager for OPA and Regal")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install a version (`opavm install 1.2.3`, `opavm install regal 0.38.1`)
    Install(InstallArgs),
    /// Remove an installed version
    Uninstall(UninstallArgs),
    /// List installed versions
    List(ListArgs),
    /// Set the global default version
    Use(UseArgs),
    /// Pin a version for the current directory
    Pin(PinArgs),
    /// Show the active version and why it was chosen
    Current(CurrentArgs),
    /// Print the path of the active binary
    Which(WhichArgs),
    /// Run the active binary: opavm exec [--tool regal] <args>...
    Exec(ExecArgs),
    /// Show recent upstream releases
    Releases(ReleasesArgs),
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn exit_on_error(result: Result<()>) {
    if let Err(e) = result {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Invoked through a shim named after a tool: dispatch, never parse our own CLI
fn run_shim(tool: Tool, args: Vec<OsString>) -> ! {
    init_logging(false);
    let result = CommandContext::initialize()
        .and_then(|context| context.dispatcher().dispatch(tool, &context.cwd, args));
    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            print_error(&e.to_string());
            std::process::exit(1);
        }
    }
}

fn main() {
    let mut argv = env::args_os();
    let argv0 = argv.next().unwrap_or_default();
    if let Some(tool) = Tool::from_invocation(&argv0.to_string_lossy()) {
        run_shim(tool, argv.collect());
    }

    let cli = Cli::parse();
    init_logging(cli.debug);

    match cli.command {
        Commands::Install(args) => exit_on_error(execute_install(args)),
        Commands::Uninstall(args) => exit_on_error(execute_uninstall(args)),
        Commands::List(args) => exit_on_error(execute_list(args)),
        Commands::Use(args) => exit_on_error(execute_use(args)),
        Commands::Pin(args) => exit_on_error(execute_pin(args)),
        Commands::Current(args) => exit_on_error(execute_current(args)),
        Commands::Which(args) => exit_on_error(execute_which(args)),
        Commands::Exec(args) => match execute_exec(args) {
            Ok(code) => std::process::exit(code),
            Err(e) => {
                print_error(&e.to_string());
                std::process::exit(1);
            }
        },
        Commands::Releases(args) => exit_on_error(execute_releases(args)),
    }
}
