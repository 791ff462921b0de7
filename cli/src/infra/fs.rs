//! Filesystem infrastructure: implements the `LocalFs` port.

use std::io::{ErrorKind, Write as _};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use anyhow::{Context, Result};
use nix::unistd::{Gid, Group, Uid, User};

/// Mode of every file this tool publishes.
const PUBLISHED_MODE: u32 = 0o644;

/// Production filesystem implementation of `LocalFs`.
pub struct LocalFs;

impl crate::application::ports::LocalFs for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.symlink_metadata().is_ok()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("creating directory {}", path.display()))
    }

    fn read_if_exists(&self, path: &Path) -> Result<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading file {}", path.display())),
        }
    }

    fn write_atomic(&self, path: &Path, content: &str) -> Result<()> {
        write_atomic(path, content)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).with_context(|| format!("removing file {}", path.display()))
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).with_context(|| format!("listing {}", dir.display())),
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("listing {}", dir.display()))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn symlink(&self, target: &Path, link: &Path) -> Result<bool> {
        match std::os::unix::fs::symlink(target, link) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e).with_context(|| {
                format!("linking {} -> {}", link.display(), target.display())
            }),
        }
    }

    fn chown(&self, path: &Path, user: Option<&str>, group: Option<&str>) -> Result<()> {
        let uid = user.map(lookup_uid).transpose()?;
        let gid = group.map(lookup_gid).transpose()?;
        nix::unistd::chown(path, uid, gid)
            .with_context(|| format!("changing owner of {}", path.display()))
    }
}

fn lookup_uid(name: &str) -> Result<Uid> {
    User::from_name(name)
        .with_context(|| format!("looking up user '{name}'"))?
        .map(|u| u.uid)
        .ok_or_else(|| anyhow::anyhow!("no such user '{name}'"))
}

fn lookup_gid(name: &str) -> Result<Gid> {
    Group::from_name(name)
        .with_context(|| format!("looking up group '{name}'"))?
        .map(|g| g.gid)
        .ok_or_else(|| anyhow::anyhow!("no such group '{name}'"))
}

/// Replace `path` atomically: temp file in the same directory, fsync, rename.
///
/// Readers see either the old content or the new content, never a partial
/// file. The temp file is removed if any step fails.
///
/// # Errors
///
/// Returns an error if the temp file cannot be created, written, synced or
/// renamed into place.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    replace_with(path, |file| {
        file.write_all(content.as_bytes())
            .with_context(|| format!("writing temp file for {}", path.display()))
    })
}

/// Temp file filled by `fill`, then renamed over `path`.
fn replace_with(path: &Path, fill: impl FnOnce(&mut std::fs::File) -> Result<()>) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow::anyhow!("not a file path: {}", path.display()))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".tmp")
        .tempfile_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    fill(tmp.as_file_mut())?;
    tmp.as_file()
        .set_permissions(std::fs::Permissions::from_mode(PUBLISHED_MODE))
        .with_context(|| format!("setting permissions for {}", path.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("syncing temp file for {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("finalizing {}", path.display()))?;
    Ok(())
}
