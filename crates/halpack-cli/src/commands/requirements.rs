use super::{colorize_kind, json_pretty, load_engine, CliError, EXIT_SUCCESS};
use std::path::Path;

pub fn run(recipe: &Path, json: bool) -> Result<u8, CliError> {
    let engine = load_engine(recipe)?;
    let table = engine.requirements();
    if json {
        let entries: Vec<_> = table.iter().collect();
        println!("{}", json_pretty(&entries)?);
    } else if table.is_empty() {
        println!("{} declares no requirements", engine.recipe().reference());
    } else {
        println!("{:<15} {:<20} RANGE", "KIND", "NAME");
        for constraint in table.iter() {
            println!(
                "{:<15} {:<20} {}",
                colorize_kind(constraint.kind.as_str()),
                constraint.name,
                constraint.range
            );
        }
    }
    Ok(EXIT_SUCCESS)
}
