use halpack_schema::{CompilerSettings, OsClass};
use std::fmt;
use std::process::Command;

/// A missing prerequisite with actionable install instructions.
#[derive(Debug)]
pub struct MissingPrereq {
    pub name: String,
    pub purpose: &'static str,
    pub install_hint: &'static str,
}

impl fmt::Display for MissingPrereq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "  - {}: {} (install: {})",
            self.name, self.purpose, self.install_hint
        )
    }
}

pub(crate) fn command_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// C++ compiler driver expected on `PATH` for the given settings.
pub fn compiler_driver(compiler: &CompilerSettings, os: OsClass) -> String {
    match (compiler.name.as_str(), os) {
        ("gcc", OsClass::Baremetal) => "arm-none-eabi-g++".to_owned(),
        ("gcc", _) => "g++".to_owned(),
        ("clang" | "apple-clang", _) => "clang++".to_owned(),
        (other, _) => other.to_owned(),
    }
}

/// Check the host tools a toolchain backend shells out to.
/// Returns a list of missing items. Empty list means all prerequisites are met.
pub fn check_toolchain_prereqs(
    toolchain: &str,
    compiler: &CompilerSettings,
    os: OsClass,
) -> Vec<MissingPrereq> {
    let mut missing = Vec::new();
    if toolchain != "cmake" {
        return missing;
    }

    if !command_exists("cmake") {
        missing.push(MissingPrereq {
            name: "cmake".to_owned(),
            purpose: "configuring and building the package sources",
            install_hint: "apt install cmake | dnf install cmake | brew install cmake | pip install cmake",
        });
    }

    let driver = compiler_driver(compiler, os);
    if !command_exists(&driver) {
        missing.push(MissingPrereq {
            name: driver,
            purpose: "compiling the driver library",
            install_hint: "install the compiler named in the profile, or adjust settings.compiler",
        });
    }

    missing
}

/// Format a list of missing prerequisites into a user-friendly error message.
pub fn format_missing(missing: &[MissingPrereq]) -> String {
    use std::fmt::Write as _;
    let mut msg = String::from("missing prerequisites:\n");
    for m in missing {
        let _ = writeln!(msg, "{m}");
    }
    msg.push_str("\nhalpack shells out to these tools to build packages.");
    msg
}
