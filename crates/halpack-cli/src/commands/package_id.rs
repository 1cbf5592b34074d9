use super::{json_pretty, load_config, CliError, ProfileArgs, EXIT_SUCCESS};
use std::path::Path;

pub fn run(recipe: &Path, profile: &ProfileArgs, json: bool) -> Result<u8, CliError> {
    let (engine, config) = load_config(recipe, profile)?;
    let identity = engine.package_id(&config);
    let resolution = engine.resolve(&config);

    if json {
        let payload = serde_json::json!({
            "reference": engine.recipe().reference(),
            "package_id": identity.package_id,
            "short_id": identity.short_id,
            "platform": config.platform,
            "platform_in_identity": resolution.affects_identity,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("{}", identity.package_id);
        println!("short_id: {}", identity.short_id);
        if !resolution.affects_identity {
            println!("platform '{}' does not change this package", config.platform);
        }
    }
    Ok(EXIT_SUCCESS)
}
