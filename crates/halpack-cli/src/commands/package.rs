use super::{json_pretty, load_config, package_folder, CliError, ProfileArgs, EXIT_SUCCESS};
use std::path::Path;

/// Package the outputs of an earlier `halpack build`.
pub fn run(
    recipe: &Path,
    profile: &ProfileArgs,
    folder: Option<&Path>,
    json: bool,
) -> Result<u8, CliError> {
    let (engine, config) = load_config(recipe, profile)?;
    let folder = package_folder(&engine, folder);
    let artifacts = engine.existing_artifacts(&config)?;
    let (report, metadata) = engine.package(&config, &artifacts, &folder)?;

    if json {
        let payload = serde_json::json!({
            "package_folder": folder,
            "report": report,
            "metadata": metadata,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "packaged {} into {}",
            metadata.reference,
            folder.display()
        );
        println!(
            "{} files copied, {} unchanged",
            report.copied, report.unchanged
        );
    }
    Ok(EXIT_SUCCESS)
}
