use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Refuse to write merge output over either input document.
pub fn ensure_output_is_not_input(output: &Path, inputs: &[&Path]) -> Result<()> {
    let target = comparable_path(output)
        .with_context(|| format!("failed to resolve output path {}", output.display()))?;

    let clashes = inputs
        .iter()
        .map(|input| {
            comparable_path(input)
                .with_context(|| format!("failed to resolve input path {}", input.display()))
                .map(|source| source == target)
        })
        .collect::<Result<Vec<bool>>>()?;

    if clashes.contains(&true) {
        let names = inputs
            .iter()
            .map(|input| input.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        bail!(
            "merge output {} would overwrite one of its inputs ({names})",
            output.display()
        );
    }
    Ok(())
}

fn comparable_path(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return path
            .canonicalize()
            .with_context(|| format!("canonicalize {}", path.display()));
    }

    // Not on disk yet: anchor relative paths at the working directory without
    // resolving `..` components.
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir().context("current_dir")?.join(path))
}
