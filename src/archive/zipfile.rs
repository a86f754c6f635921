//! Zip-backed archiver

use std::collections::{BTreeSet, HashSet};
use std::fs::{self, File};
use std::io::{self, Cursor, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::{ArchiveListing, Archiver, ListedEntry};
use crate::error::Result;
use crate::error::archive as archive_error;
use crate::path_utils::{ensure_parent, list_files};

/// Reads and writes jar/zip archives with the `zip` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipArchiver;

impl Archiver for ZipArchiver {
    fn extract(&self, archive_path: &Path, dest: &Path) -> Result<ArchiveListing> {
        let failed = |reason: String| {
            archive_error::extraction_failed(archive_path.display().to_string(), reason)
        };

        let file = File::open(archive_path).map_err(|e| failed(format!("cannot open: {e}")))?;
        let mut zip =
            ZipArchive::new(file).map_err(|e| failed(format!("invalid or corrupt archive: {e}")))?;

        fs::create_dir_all(dest).map_err(|e| failed(format!("cannot create destination: {e}")))?;

        let mut listing = ArchiveListing::default();
        let mut seen = HashSet::new();

        for i in 0..zip.len() {
            let mut entry = zip
                .by_index(i)
                .map_err(|e| failed(format!("cannot read entry {i}: {e}")))?;

            let Some(relative) = entry.enclosed_name() else {
                return Err(failed(format!("unsafe entry name '{}'", entry.name())));
            };
            let name = entry.name().trim_end_matches('/').to_string();
            if name.is_empty() {
                continue;
            }

            let output_path = dest.join(&relative);
            let is_dir = entry.is_dir();

            if is_dir {
                fs::create_dir_all(&output_path)
                    .map_err(|e| failed(format!("cannot create {name}: {e}")))?;
            } else {
                ensure_parent(&output_path)
                    .map_err(|e| failed(format!("cannot create parent of {name}: {e}")))?;
                let mut outfile = File::create(&output_path)
                    .map_err(|e| failed(format!("cannot create {name}: {e}")))?;
                io::copy(&mut entry, &mut outfile)
                    .map_err(|e| failed(format!("cannot write {name}: {e}")))?;
            }

            // A later duplicate overwrites the file but keeps the first position
            if seen.insert(name.clone()) {
                listing.entries.push(ListedEntry { name, is_dir });
            }
        }

        Ok(listing)
    }

    fn pack(&self, root: &Path, listing: &ArchiveListing, out: &mut dyn Write) -> Result<()> {
        let failed = |reason: String| archive_error::packaging_failed(reason);

        let mut remaining: BTreeSet<String> = list_files(root)
            .map_err(|e| failed(e.to_string()))?
            .into_iter()
            .collect();
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in &listing.entries {
            if entry.is_dir {
                if root.join(&entry.name).is_dir() {
                    writer
                        .add_directory(format!("{}/", entry.name), options)
                        .map_err(|e| failed(format!("cannot add {}: {e}", entry.name)))?;
                }
            } else if remaining.remove(&entry.name) {
                write_member(&mut writer, root, &entry.name, options)?;
            }
        }

        for name in &remaining {
            write_member(&mut writer, root, name, options)?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| failed(format!("cannot finish archive: {e}")))?;
        out.write_all(cursor.get_ref())
            .map_err(|e| failed(format!("cannot write archive: {e}")))?;
        out.flush()
            .map_err(|e| failed(format!("cannot write archive: {e}")))?;

        Ok(())
    }
}

fn write_member(
    writer: &mut ZipWriter<Cursor<Vec<u8>>>,
    root: &Path,
    name: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    let contents = fs::read(root.join(name))
        .map_err(|e| archive_error::packaging_failed(format!("cannot read {name}: {e}")))?;
    writer
        .start_file(name, options)
        .map_err(|e| archive_error::packaging_failed(format!("cannot add {name}: {e}")))?;
    writer
        .write_all(&contents)
        .map_err(|e| archive_error::packaging_failed(format!("cannot write {name}: {e}")))?;
    Ok(())
}
