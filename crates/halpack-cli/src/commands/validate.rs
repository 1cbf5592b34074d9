use super::{json_pretty, load_config, yes_no, CliError, ProfileArgs, EXIT_SUCCESS};
use std::path::Path;

pub fn run(recipe: &Path, profile: &ProfileArgs, json: bool) -> Result<u8, CliError> {
    let (engine, config) = load_config(recipe, profile)?;
    engine.validate(&config)?;
    let resolution = engine.resolve(&config);

    if json {
        let payload = serde_json::json!({
            "status": "valid",
            "reference": engine.recipe().reference(),
            "platform": config.platform,
            "needs_linker_script": resolution.needs_linker_script,
            "affects_identity": resolution.affects_identity,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "✓ {} can be built for {}/{} ({} {})",
            engine.recipe().reference(),
            config.settings.os,
            config.settings.arch,
            config.settings.compiler.name,
            config.settings.compiler.version
        );
        println!("platform: {}", config.platform);
        println!(
            "linker script: {}",
            yes_no(resolution.needs_linker_script)
        );
    }
    Ok(EXIT_SUCCESS)
}
