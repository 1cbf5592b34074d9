use super::{json_pretty, load_config, package_folder, CliError, ProfileArgs, EXIT_SUCCESS};
use std::path::Path;

pub fn run(
    recipe: &Path,
    profile: &ProfileArgs,
    folder: Option<&Path>,
    json: bool,
) -> Result<u8, CliError> {
    let (engine, config) = load_config(recipe, profile)?;
    let folder = package_folder(&engine, folder);
    let info = engine.package_info(&config, &folder);

    if json {
        println!("{}", json_pretty(&info)?);
    } else {
        println!("cmake target: {}", info.cmake_target_name);
        println!("libs: {}", info.libs.join(" "));
        if info.exelinkflags.is_empty() {
            println!("exelinkflags: (none)");
        } else {
            println!("exelinkflags: {}", info.exelinkflags.join(" "));
        }
    }
    Ok(EXIT_SUCCESS)
}
