pub mod build;
pub mod completions;
pub mod create;
pub mod info;
pub mod lock;
pub mod new;
pub mod package;
pub mod package_id;
pub mod presets;
pub mod requirements;
pub mod validate;

use clap::Args;
use halpack_core::{CoreError, Engine, RecipeConfig};
use halpack_schema::{parse_profile_file, Profile, ProfileError, ProfileV1, PLATFORM_OPTION};
use halpack_toolchain::ToolchainError;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;
pub const EXIT_TOOLCHAIN_ERROR: u8 = 3;

/// A failed command: the message for stderr and the process exit code.
#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
}

impl CliError {
    pub fn config(message: impl Into<String>) -> Self {
        Self {
            code: EXIT_CONFIG_ERROR,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            code: EXIT_FAILURE,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<CoreError> for CliError {
    fn from(e: CoreError) -> Self {
        let code = if e.is_configuration_error() {
            EXIT_CONFIG_ERROR
        } else if matches!(e, CoreError::Toolchain(_)) {
            EXIT_TOOLCHAIN_ERROR
        } else {
            EXIT_FAILURE
        };
        Self {
            code,
            message: e.to_string(),
        }
    }
}

impl From<ProfileError> for CliError {
    fn from(e: ProfileError) -> Self {
        CoreError::from(e).into()
    }
}

impl From<ToolchainError> for CliError {
    fn from(e: ToolchainError) -> Self {
        CoreError::from(e).into()
    }
}

impl From<String> for CliError {
    fn from(message: String) -> Self {
        Self::failure(message)
    }
}

/// Target settings and option values, from a profile file and/or flags.
/// Flags override the profile.
#[derive(Debug, Clone, Default, Args)]
pub struct ProfileArgs {
    /// Profile TOML file with [settings] and [options] tables.
    #[arg(long)]
    pub profile: Option<PathBuf>,
    /// Target OS (baremetal, linux, macos, windows, freebsd).
    #[arg(long)]
    pub os: Option<String>,
    /// Target architecture, e.g. cortex-m4f.
    #[arg(long)]
    pub arch: Option<String>,
    /// Debug, Release, RelWithDebInfo or MinSizeRel.
    #[arg(long)]
    pub build_type: Option<String>,
    /// Compiler name (gcc, clang, apple-clang).
    #[arg(long)]
    pub compiler: Option<String>,
    #[arg(long)]
    pub compiler_version: Option<String>,
    /// C++ standard, e.g. 20 or gnu20.
    #[arg(long)]
    pub cppstd: Option<String>,
    /// Recipe option as KEY=VALUE. Repeatable.
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,
    /// Shorthand for `-o platform=<VALUE>`.
    #[arg(long)]
    pub platform: Option<String>,
}

impl ProfileArgs {
    pub fn to_profile(&self) -> Result<Profile, CliError> {
        let mut raw = match &self.profile {
            Some(path) => {
                debug!("loading profile {}", path.display());
                parse_profile_file(path)?
            }
            None => ProfileV1::default(),
        };

        let settings = &mut raw.settings;
        override_with(&mut settings.os, self.os.as_ref());
        override_with(&mut settings.arch, self.arch.as_ref());
        override_with(&mut settings.build_type, self.build_type.as_ref());
        override_with(&mut settings.compiler.name, self.compiler.as_ref());
        override_with(&mut settings.compiler.version, self.compiler_version.as_ref());
        override_with(&mut settings.compiler.cppstd, self.cppstd.as_ref());

        for option in &self.options {
            let (key, value) = option.split_once('=').ok_or_else(|| {
                CliError::config(format!("invalid option '{option}' (expected KEY=VALUE)"))
            })?;
            raw.options.insert(key.trim().to_owned(), value.trim().to_owned());
        }
        if let Some(platform) = &self.platform {
            raw.options
                .insert(PLATFORM_OPTION.to_owned(), platform.clone());
        }

        Ok(raw.resolve()?)
    }
}

fn override_with(slot: &mut Option<String>, value: Option<&String>) {
    if let Some(v) = value {
        *slot = Some(v.clone());
    }
}

pub fn load_engine(recipe: &Path) -> Result<Engine, CliError> {
    Ok(Engine::load(recipe)?)
}

pub fn load_config(recipe: &Path, profile: &ProfileArgs) -> Result<(Engine, RecipeConfig), CliError> {
    let engine = load_engine(recipe)?;
    let config = engine.config_for(&profile.to_profile()?)?;
    Ok((engine, config))
}

/// `--package-folder`, or `package/` next to the recipe.
pub fn package_folder(engine: &Engine, explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(|| engine.source().root().join("package"), Path::to_path_buf)
}

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
    pb.set_style(style);
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn plain_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg}").unwrap_or_else(|_| ProgressStyle::default_spinner())
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(plain_style());
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    pb.set_style(plain_style());
    pb.finish_with_message(format!("✗ {msg}"));
}

/// Run `op` under a spinner unless output is JSON.
pub fn with_spinner<T>(
    json: bool,
    start: &str,
    done: &str,
    failed: &str,
    op: impl FnOnce() -> Result<T, CoreError>,
) -> Result<T, CliError> {
    let pb = if json { None } else { Some(spinner(start)) };
    match op() {
        Ok(v) => {
            if let Some(ref pb) = pb {
                spin_ok(pb, done);
            }
            Ok(v)
        }
        Err(e) => {
            if let Some(ref pb) = pb {
                spin_fail(pb, failed);
            }
            Err(e.into())
        }
    }
}

pub fn colorize_kind(kind: &str) -> String {
    use console::Style;
    match kind {
        "requires" => Style::new().green().apply_to(kind).to_string(),
        "tool_requires" => Style::new().cyan().apply_to(kind).to_string(),
        "test_requires" => Style::new().yellow().apply_to(kind).to_string(),
        other => other.to_owned(),
    }
}

pub fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
