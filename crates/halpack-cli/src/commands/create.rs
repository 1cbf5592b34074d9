use super::{
    json_pretty, load_config, package_folder, with_spinner, yes_no, CliError, ProfileArgs,
    EXIT_SUCCESS,
};
use std::path::Path;

pub fn run(
    recipe: &Path,
    profile: &ProfileArgs,
    folder: Option<&Path>,
    json: bool,
) -> Result<u8, CliError> {
    let (engine, config) = load_config(recipe, profile)?;
    let folder = package_folder(&engine, folder);
    let result = with_spinner(
        json,
        "creating package...",
        "package created",
        "create failed",
        || engine.create(&config, &folder),
    )?;

    if json {
        println!("{}", json_pretty(&result)?);
    } else {
        println!(
            "created {} {}",
            result.metadata.reference, result.identity.short_id
        );
        println!("package_id: {}", result.identity.package_id);
        println!("folder: {}", folder.display());
        println!(
            "linker script: {}",
            yes_no(result.resolution.needs_linker_script)
        );
        if !result.metadata.info.exelinkflags.is_empty() {
            println!(
                "exelinkflags: {}",
                result.metadata.info.exelinkflags.join(" ")
            );
        }
    }
    Ok(EXIT_SUCCESS)
}
