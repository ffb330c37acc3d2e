//! Archive assembly
//!
//! Collects named PDF payloads and serializes them into one ZIP blob.
//! Entry names are unique: when two items resolve to the same output
//! name the later one gets a numeric suffix (`nome.pdf`, `nome-2.pdf`,
//! ...) instead of silently overwriting the earlier entry.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{AppResult, ArchiveError};

/// Incremental ZIP builder for one batch
pub struct ArchiveAssembler {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    used_names: HashSet<String>,
    entry_count: usize,
}

impl ArchiveAssembler {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            used_names: HashSet::new(),
            entry_count: 0,
        }
    }

    /// Number of entries recorded so far
    pub fn len(&self) -> usize {
        self.entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    /// Record one entry, returning the (possibly disambiguated) name it
    /// was stored under
    pub fn add(&mut self, name: &str, payload: &[u8]) -> AppResult<String> {
        let final_name = self.unique_name(name);
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        self.writer
            .start_file(&final_name, options)
            .map_err(|e| ArchiveError::EntryWriteFailed {
                name: final_name.clone(),
                source: Box::new(e),
            })?;
        self.writer
            .write_all(payload)
            .map_err(|e| ArchiveError::EntryWriteFailed {
                name: final_name.clone(),
                source: Box::new(e),
            })?;

        debug!("archive entry recorded: {} ({} bytes)", final_name, payload.len());
        self.used_names.insert(final_name.clone());
        self.entry_count += 1;
        Ok(final_name)
    }

    /// Serialize all recorded entries; zero entries still yield a
    /// valid (empty) archive
    pub fn finalize(self) -> AppResult<Vec<u8>> {
        let cursor = self
            .writer
            .finish()
            .map_err(|e| ArchiveError::FinalizeFailed {
                source: Box::new(e),
            })?;
        Ok(cursor.into_inner())
    }

    fn unique_name(&self, name: &str) -> String {
        if !self.used_names.contains(name) {
            return name.to_string();
        }
        let (stem, ext) = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), format!(".{}", ext)),
            _ => (name.to_string(), String::new()),
        };
        let mut n = 2;
        loop {
            let candidate = format!("{}-{}{}", stem, n, ext);
            if !self.used_names.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

impl Default for ArchiveAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn entry_names(bytes: &[u8]) -> Vec<String> {
        let archive = ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    #[test]
    fn records_entries_in_insertion_order() {
        let mut assembler = ArchiveAssembler::new();
        assembler.add("a.pdf", b"aaa").unwrap();
        assembler.add("b.pdf", b"bbb").unwrap();
        assembler.add("c.pdf", b"ccc").unwrap();

        let bytes = assembler.finalize().unwrap();
        assert_eq!(entry_names(&bytes), vec!["a.pdf", "b.pdf", "c.pdf"]);
    }

    #[test]
    fn duplicate_names_get_numeric_suffixes() {
        let mut assembler = ArchiveAssembler::new();
        assert_eq!(assembler.add("nome.pdf", b"1").unwrap(), "nome.pdf");
        assert_eq!(assembler.add("nome.pdf", b"2").unwrap(), "nome-2.pdf");
        assert_eq!(assembler.add("nome.pdf", b"3").unwrap(), "nome-3.pdf");

        let bytes = assembler.finalize().unwrap();
        assert_eq!(
            entry_names(&bytes),
            vec!["nome.pdf", "nome-2.pdf", "nome-3.pdf"]
        );
    }

    #[test]
    fn payload_round_trips() {
        let mut assembler = ArchiveAssembler::new();
        assembler.add("doc.pdf", b"%PDF-1.7 fake body").unwrap();
        let bytes = assembler.finalize().unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut entry = archive.by_name("doc.pdf").unwrap();
        let mut payload = Vec::new();
        entry.read_to_end(&mut payload).unwrap();
        assert_eq!(payload, b"%PDF-1.7 fake body");
    }

    #[test]
    fn zero_entries_finalize_into_a_valid_empty_archive() {
        let assembler = ArchiveAssembler::new();
        assert!(assembler.is_empty());
        let bytes = assembler.finalize().unwrap();

        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn suffix_lands_before_the_extension() {
        let mut assembler = ArchiveAssembler::new();
        assembler.add("relatorio.final.pdf", b"1").unwrap();
        assert_eq!(
            assembler.add("relatorio.final.pdf", b"2").unwrap(),
            "relatorio.final-2.pdf"
        );
    }
}
