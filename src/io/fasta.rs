use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bio::io::fasta;

use crate::constants::*;
use crate::error::{Error, Result};
use crate::seq::DnaSeq;

/// Sequence name used as a lookup key: the full header up to `delim`, or the
/// first word when no delimiter is given.
fn record_key(record: &fasta::Record, delim: Option<&str>) -> String {
    match delim {
        Some(d) => {
            let header = match record.desc() {
                Some(desc) => format!("{} {}", record.id(), desc),
                None => record.id().to_owned(),
            };
            match header.find(d) {
                Some(i) => header[..i].to_owned(),
                None => header,
            }
        },
        None => record.id().to_owned(),
    }
}

/// Read all records, upper-casing the sequences.
pub fn read_records<R: io::Read>(reader: R, delim: Option<&str>) -> Result<Vec<(String, DnaSeq)>> {
    let mut records = Vec::new();
    for r in fasta::Reader::new(reader).records() {
        let record = r?;
        let seq = record.seq().iter().map(|x| x.to_ascii_uppercase()).collect();
        records.push((record_key(&record, delim), seq));
    }
    Ok(records)
}

/// Read a genome into memory, keyed by sequence name.
pub fn read_genome<P: AsRef<Path>>(path: P, delim: Option<&str>) -> Result<HashMap<String, DnaSeq>> {
    let reader = super::open(&path)?;
    let records = read_records(reader, delim)?;
    if records.is_empty() {
        return Err(Error::NoSequences);
    }
    Ok(records.into_iter().collect())
}

/// FASTA files at `path`: the file itself, or every file in the directory
/// with a FASTA extension, in name order.
pub fn fasta_files<P: AsRef<Path>>(path: P) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(path)? {
        let p = entry?.path();
        let name = p.to_string_lossy().to_lowercase();
        if p.is_file() && FASTA_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
            files.push(p);
        }
    }
    if files.is_empty() {
        return Err(Error::NoFastaFiles(path.display().to_string()));
    }
    files.sort();
    Ok(files)
}

/// Read coding sequences from a file or a directory of files.
///
/// Files without records are reported and skipped. Sequence names are kept in
/// file order.
pub fn read_cds<P: AsRef<Path>>(path: P, delim: Option<&str>) -> Result<Vec<(String, DnaSeq)>> {
    let mut cds = Vec::new();
    for file in fasta_files(path)? {
        let records = read_records(super::open(&file)?, delim)?;
        if records.is_empty() {
            log::warn!("no sequences read from {}; skipping", file.display());
            continue;
        }
        log::debug!("read {} sequences from {}", records.len(), file.display());
        cds.extend(records);
    }
    if cds.is_empty() {
        return Err(Error::NoSequences);
    }
    Ok(cds)
}

/// FASTA sink for extracted sequences.
pub struct Writer<W: io::Write> {
    inner: fasta::Writer<W>,
}

impl Writer<fs::File> {
    pub fn to_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        fs::File::create(path).map(Writer::new)
    }
}

impl<W: io::Write> Writer<W> {
    pub fn new(writer: W) -> Self {
        Writer { inner: fasta::Writer::new(writer) }
    }

    pub fn write(&mut self, id: &str, seq: &[u8]) -> io::Result<()> {
        self.inner.write(id, None, seq)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
