use super::{json_pretty, CliError, EXIT_SUCCESS};
use halpack_schema::{get_preset, list_presets, parse_recipe_str};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

fn load_preset(name: &str) -> Result<&'static str, CliError> {
    let preset = get_preset(name).ok_or_else(|| {
        let known: Vec<_> = list_presets().iter().map(|p| p.name).collect();
        CliError::config(format!(
            "unknown preset '{name}' (expected: {})",
            known.join(", ")
        ))
    })?;
    parse_recipe_str(preset.recipe)
        .and_then(|r| r.normalize())
        .map_err(|e| CliError::failure(format!("preset '{name}' is invalid: {e}")))?;
    Ok(preset.recipe)
}

fn write_atomic(dest: &Path, content: &str) -> Result<(), CliError> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let mut tmp =
        NamedTempFile::new_in(&dir).map_err(|e| CliError::failure(format!("write temp file: {e}")))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| CliError::failure(format!("write temp file: {e}")))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| CliError::failure(format!("fsync temp file: {e}")))?;
    tmp.persist(dest)
        .map_err(|e| CliError::failure(format!("persist recipe: {}", e.error)))?;
    Ok(())
}

pub fn run(dest: &Path, preset: &str, force: bool, json: bool) -> Result<u8, CliError> {
    let recipe = load_preset(preset)?;
    if dest.exists() && !force {
        return Err(CliError::failure(format!(
            "refusing to overwrite existing {} (pass --force)",
            dest.display()
        )));
    }
    write_atomic(dest, recipe)?;

    if json {
        let payload = serde_json::json!({
            "status": "written",
            "path": dest,
            "preset": preset,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("wrote {} from preset '{preset}'", dest.display());
    }
    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_preset_lists_known_names() {
        let err = load_preset("stm32f7").unwrap_err();
        assert!(err.message.contains("stm32f4"));
        assert!(err.message.contains("stm32f4-profiles"));
    }

    #[test]
    fn write_atomic_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("halpack.toml");
        write_atomic(&dest, "a").unwrap();
        write_atomic(&dest, "b").unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "b");
    }
}
