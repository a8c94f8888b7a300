//! Whitelist extraction of compressed tarballs.

use std::path::{Component, Path, PathBuf};

use regex_lite::Regex;

use super::ArchiveError;

enum Compression {
    Gzip,
    Bzip2,
}

/// Extract the entries of `archive` whose names match `include` into
/// `out_dir`, returning the materialized paths in iteration order.
///
/// Decompression and tar iteration stream; non-matching entries are
/// skipped without being read. Only regular files are materialized,
/// parents are created as needed, and unix permission bits are preserved.
/// The first error aborts the call: no partial result is returned.
pub async fn extract(
    archive: &Path,
    include: &Regex,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, ArchiveError> {
    let archive = archive.to_path_buf();
    let include = include.clone();
    let out_dir = out_dir.to_path_buf();

    tokio::task::spawn_blocking(move || extract_blocking(&archive, &include, &out_dir))
        .await
        .map_err(|e| ArchiveError::Io(std::io::Error::other(e)))?
}

fn extract_blocking(
    archive: &Path,
    include: &Regex,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, ArchiveError> {
    let kind = archive_kind(archive)?;
    let file = std::fs::File::open(archive)?;
    let reader: Box<dyn std::io::Read> = match kind {
        Compression::Gzip => Box::new(flate2::read::GzDecoder::new(file)),
        Compression::Bzip2 => Box::new(bzip2::read::BzDecoder::new(file)),
    };

    let mut tar = tar::Archive::new(reader);
    let mut paths = Vec::new();

    for entry in tar.entries().map_err(|e| malformed(archive, e))? {
        let mut entry = entry.map_err(|e| malformed(archive, e))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let entry_path = entry.path().map_err(|e| malformed(archive, e))?.into_owned();
        let name = entry_path.to_string_lossy();
        if !include.is_match(&name) {
            continue;
        }
        // Refuse entries that would escape the output directory.
        if entry_path
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            continue;
        }

        let dest = out_dir.join(&entry_path);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = std::fs::File::create(&dest)?;
        std::io::copy(&mut entry, &mut out)?;

        #[cfg(unix)]
        if let Ok(mode) = entry.header().mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&dest, std::fs::Permissions::from_mode(mode))?;
        }

        paths.push(dest);
    }

    Ok(paths)
}

fn archive_kind(path: &Path) -> Result<Compression, ArchiveError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if name.ends_with(".tar.bz2") {
        Ok(Compression::Bzip2)
    } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        Ok(Compression::Gzip)
    } else {
        Err(ArchiveError::UnsupportedFormat(name))
    }
}

fn malformed(archive: &Path, error: std::io::Error) -> ArchiveError {
    ArchiveError::Malformed {
        path: archive.to_path_buf(),
        reason: error.to_string(),
    }
}
