mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::ProfileArgs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "halpack",
    version,
    about = "Package-build recipe engine for libhal driver libraries"
)]
struct Cli {
    /// Path to the recipe TOML file.
    #[arg(long, default_value = "halpack.toml", global = true)]
    recipe: PathBuf,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write a recipe from a built-in preset.
    New {
        /// Preset name (see `halpack presets`).
        #[arg(default_value = "stm32f4")]
        preset: String,
        /// Overwrite an existing recipe file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// List built-in recipe presets.
    Presets,
    /// Show the declared dependency constraints.
    Requirements,
    /// Check that the recipe supports the given settings and options.
    Validate {
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Print the binary package identity for a configuration.
    PackageId {
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Resolve dependency constraints and write halpack.lock.
    Lock {
        /// Local package index TOML. Without it, each range resolves to its floor.
        #[arg(long)]
        index: Option<PathBuf>,
        /// Verify the existing lock file instead of re-resolving.
        #[arg(long, default_value_t = false)]
        locked: bool,
    },
    /// Configure and compile the package.
    Build {
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Populate a package folder from an existing build.
    Package {
        #[command(flatten)]
        profile: ProfileArgs,
        /// Install tree to populate (default: package/ next to the recipe).
        #[arg(long)]
        package_folder: Option<PathBuf>,
    },
    /// Show what consumers need to link against the package.
    Info {
        #[command(flatten)]
        profile: ProfileArgs,
        /// Install tree the flags refer to (default: package/ next to the recipe).
        #[arg(long)]
        package_folder: Option<PathBuf>,
    },
    /// Validate, build, and package in one step.
    Create {
        #[command(flatten)]
        profile: ProfileArgs,
        /// Install tree to populate (default: package/ next to the recipe).
        #[arg(long)]
        package_folder: Option<PathBuf>,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("HALPACK_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let recipe = cli.recipe.as_path();
    let json = cli.json;

    let result = match &cli.command {
        Commands::New { preset, force } => commands::new::run(recipe, preset, *force, json),
        Commands::Presets => commands::presets::run(json),
        Commands::Requirements => commands::requirements::run(recipe, json),
        Commands::Validate { profile } => commands::validate::run(recipe, profile, json),
        Commands::PackageId { profile } => commands::package_id::run(recipe, profile, json),
        Commands::Lock { index, locked } => {
            commands::lock::run(recipe, index.as_deref(), *locked, json)
        }
        Commands::Build { profile } => commands::build::run(recipe, profile, json),
        Commands::Package {
            profile,
            package_folder,
        } => commands::package::run(recipe, profile, package_folder.as_deref(), json),
        Commands::Info {
            profile,
            package_folder,
        } => commands::info::run(recipe, profile, package_folder.as_deref(), json),
        Commands::Create {
            profile,
            package_folder,
        } => commands::create::run(recipe, profile, package_folder.as_deref(), json),
        Commands::Completions { shell } => commands::completions::run::<Cli>(*shell),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.code)
        }
    }
}
