//! Chunk output: one Markdown file per chunk, or JSON lines.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::chunking::ChunkRecord;
use crate::error::Result;

/// Write one file per chunk into `output_dir`, creating it if needed.
///
/// Files are named by [`ChunkRecord::file_name`]. Each file is written to a
/// temp file, synced, then renamed, so an interrupted run never leaves a
/// truncated chunk behind.
///
/// # Returns
/// Paths of the written files, in record order
pub fn write_chunk_files(records: &[ChunkRecord], output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;

    let mut written = Vec::with_capacity(records.len());
    for record in records {
        let file_name = record.file_name();
        let output_file = output_dir.join(&file_name);
        let temp_file = output_dir.join(format!(".{file_name}.tmp"));

        {
            let mut file = File::create(&temp_file)?;
            file.write_all(record.content.as_bytes())?;
            file.sync_all()?;
        }

        // On Windows, rename fails if the destination already exists
        #[cfg(target_os = "windows")]
        if output_file.exists() {
            fs::remove_file(&output_file)?;
        }

        fs::rename(&temp_file, &output_file)?;
        tracing::debug!(path = %output_file.display(), "Chunk written");
        written.push(output_file);
    }

    Ok(written)
}

/// Write records as JSON, one object per line.
pub fn write_json_lines<W: Write>(records: &[ChunkRecord], mut writer: W) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::RunKind;
    use tempfile::tempdir;

    fn record(outer: usize, inner: usize, content: &str) -> ChunkRecord {
        ChunkRecord {
            document: "guide.md".to_string(),
            outer,
            inner,
            sequence: outer + inner - 1,
            kind: RunKind::Prose,
            start_line: 0,
            end_line: 1,
            token_count: Some(1),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_write_chunk_files() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("chunks");
        let records = vec![record(1, 1, "# Guide\nintro"), record(2, 1, "body")];

        let paths = write_chunk_files(&records, &out).unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("guide.md_chunk_1_1.md"));
        assert_eq!(fs::read_to_string(&paths[0]).unwrap(), "# Guide\nintro");
        assert_eq!(fs::read_to_string(&paths[1]).unwrap(), "body");

        // No temp files left behind
        let leftovers = fs::read_dir(&out)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_write_chunk_files_overwrites() {
        let dir = tempdir().unwrap();
        write_chunk_files(&[record(1, 1, "old")], dir.path()).unwrap();
        let paths = write_chunk_files(&[record(1, 1, "new")], dir.path()).unwrap();
        assert_eq!(fs::read_to_string(&paths[0]).unwrap(), "new");
    }

    #[test]
    fn test_write_json_lines() {
        let mut buf = Vec::new();
        write_json_lines(&[record(1, 1, "a"), record(1, 2, "b")], &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["inner"], 2);
        assert_eq!(second["content"], "b");
    }
}
