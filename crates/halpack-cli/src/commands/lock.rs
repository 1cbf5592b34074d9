use super::{colorize_kind, json_pretty, load_engine, CliError, EXIT_SUCCESS};
use halpack_core::LockOptions;
use halpack_toolchain::select_resolver;
use std::path::Path;

pub fn run(recipe: &Path, index: Option<&Path>, locked: bool, json: bool) -> Result<u8, CliError> {
    let engine = load_engine(recipe)?;
    let resolver = select_resolver(index)?;
    let lock = engine.resolve_dependencies(resolver.as_ref(), LockOptions { locked })?;

    if json {
        println!("{}", json_pretty(&lock)?);
    } else {
        let verb = if locked { "verified" } else { "wrote" };
        println!(
            "{verb} {} ({} dependencies)",
            engine.source().lock_file().display(),
            lock.resolved.len()
        );
        for dep in &lock.resolved {
            println!(
                "  {:<15} {:<20} {}",
                colorize_kind(dep.kind.as_str()),
                dep.name,
                dep.version
            );
        }
    }
    Ok(EXIT_SUCCESS)
}
