use super::{json_pretty, load_config, with_spinner, CliError, ProfileArgs, EXIT_SUCCESS};
use std::path::Path;

pub fn run(recipe: &Path, profile: &ProfileArgs, json: bool) -> Result<u8, CliError> {
    let (engine, config) = load_config(recipe, profile)?;
    let result = with_spinner(json, "building package...", "package built", "build failed", || {
        engine.build(&config)
    })?;

    if json {
        let payload = serde_json::json!({
            "package_id": result.identity.package_id,
            "short_id": result.identity.short_id,
            "build_dir": result.artifacts.build_dir,
            "libraries": result.artifacts.libraries,
            "status": "built"
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "built {} {}",
            engine.recipe().reference(),
            result.identity.short_id
        );
        for library in &result.artifacts.libraries {
            println!("  {}", library.display());
        }
    }
    Ok(EXIT_SUCCESS)
}
