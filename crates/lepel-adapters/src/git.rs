//! Captura del estado del repositorio git junto a los resultados.
//!
//! Escribe en `<output_dir>/git/`:
//! - `branch.<rama>` y `commit.<hash>` (ficheros vacíos como marcadores),
//! - `changes.txt` con los ficheros versionados modificados (staged o no),
//! - `changes/<ruta>` con una copia de cada uno de ellos.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{AdapterError, Result};

/// Usa el directorio actual para localizar el repositorio. Devuelve
/// `Ok(false)` si no hay repositorio (o no hay `git`).
pub fn save_git_status(output_dir: &Path) -> Result<bool> {
    let cwd = std::env::current_dir().map_err(AdapterError::io("."))?;
    save_git_status_from(&cwd, output_dir)
}

pub fn save_git_status_from(repo_dir: &Path, output_dir: &Path) -> Result<bool> {
    let Some(root) = git(repo_dir, &["rev-parse", "--show-toplevel"]) else {
        log::debug!("{} is not inside a git repository; skipping git status", repo_dir.display());
        return Ok(false);
    };
    let root = PathBuf::from(root.trim());

    let commit = git(&root, &["rev-parse", "HEAD"]).ok_or_else(|| AdapterError::Git("repository has no commits".into()))?;
    let branch = match git(&root, &["rev-parse", "--abbrev-ref", "HEAD"]) {
        Some(b) if b.trim() != "HEAD" => b.trim().replace('/', "_"),
        _ => "detached".to_string(),
    };

    let mut changes = BTreeSet::new();
    // `-z`: rutas sin comillas ni escapes, separadas por NUL.
    for args in [&["diff", "--name-only", "-z"][..], &["diff", "--name-only", "-z", "--cached"][..]] {
        let listed = git(&root, args).ok_or_else(|| AdapterError::Git(format!("git {} failed", args.join(" "))))?;
        changes.extend(listed.split('\0')
                             .filter(|l| !l.is_empty() && root.join(l).is_file())
                             .map(str::to_string));
    }

    let git_dir = output_dir.join("git");
    fs::create_dir_all(&git_dir).map_err(AdapterError::io(&git_dir))?;
    touch(&git_dir.join(format!("branch.{branch}")))?;
    touch(&git_dir.join(format!("commit.{}", commit.trim())))?;

    let listing = changes.iter().cloned().collect::<Vec<_>>().join("\n");
    let listing_path = git_dir.join("changes.txt");
    fs::write(&listing_path, listing).map_err(AdapterError::io(&listing_path))?;

    let changes_dir = git_dir.join("changes");
    fs::create_dir_all(&changes_dir).map_err(AdapterError::io(&changes_dir))?;
    for change in &changes {
        let destination = changes_dir.join(change);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(AdapterError::io(parent))?;
        }
        fs::copy(root.join(change), &destination).map_err(AdapterError::io(&destination))?;
    }

    log::info!("Saved git status ({branch} @ {}, {} changed files)", commit.trim(), changes.len());
    Ok(true)
}

/// stdout de `git <args>` si el comando existe y termina bien.
fn git(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).current_dir(dir).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout).ok()
}

fn touch(path: &Path) -> Result<()> {
    fs::write(path, b"").map_err(AdapterError::io(path))
}
