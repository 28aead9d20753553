//! Turns command-line paths into the list of files to analyze.

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};
use readmit_core::format;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Explicit file arguments are kept as given, even with an unsupported suffix, so the
/// pipeline can report them. Directories contribute only supported, non-hidden,
/// non-excluded files, sorted by path.
pub fn expand_inputs(paths: &[PathBuf], excludes: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let exclude_set = build_globset(excludes)?;
    let mut files = Vec::new();
    for root in paths {
        let meta = std::fs::metadata(root).with_context(|| format!("read {}", root.display()))?;
        if !meta.is_dir() {
            files.push(root.clone());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || should_descend(e.path(), &exclude_set))
        {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            let path = entry.path();
            if !entry.file_type().is_file() || is_excluded(path, &exclude_set) {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if format::detect(&name).is_supported() {
                found.push(path.to_path_buf());
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat)?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

fn should_descend(path: &Path, excludes: &GlobSet) -> bool {
    !is_excluded(path, excludes) && !is_hidden(path)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn is_excluded(path: &Path, excludes: &GlobSet) -> bool {
    excludes.is_match(path)
}
