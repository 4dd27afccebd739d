use std::fs::File;
use std::io;
use std::path::Path;

use crate::error::Result;
use crate::mutation::{DegeneracyTally, SubstitutionCount};
use crate::site::SiteRow;

const SUMMARY_HEADER: [&str; 9] = [
    "transcript", "gene_id", "cds_length", "mrna_length", "longest", "0fold", "2fold", "3fold", "4fold",
];

const MK_HEADER: [&str; 5] = ["transcript", "pN", "pS", "dN", "dS"];

fn tsv<W: io::Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer)
}

/// Degeneracy summary of one transcript.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptSummary {
    pub transcript: String,
    /// Absent for coding sequence input
    pub gene_id: Option<String>,
    pub cds_len: u64,
    pub mrna_len: u64,
    /// Absent for coding sequence input
    pub longest: Option<bool>,
    pub tally: DegeneracyTally,
}

/// Per-site degeneracy rows in BED-like layout, without a header.
pub struct SiteWriter<W: io::Write> {
    inner: csv::Writer<W>,
}

impl SiteWriter<File> {
    pub fn to_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(SiteWriter::new(File::create(path)?))
    }
}

impl<W: io::Write> SiteWriter<W> {
    pub fn new(writer: W) -> Self {
        SiteWriter { inner: tsv(writer) }
    }

    pub fn write(&mut self, row: &SiteRow) -> Result<()> {
        self.inner.write_record(&row.fields())?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Per-transcript degeneracy counts.
pub struct SummaryWriter<W: io::Write> {
    inner: csv::Writer<W>,
}

impl SummaryWriter<File> {
    pub fn to_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        SummaryWriter::new(File::create(path)?)
    }
}

impl<W: io::Write> SummaryWriter<W> {
    pub fn new(writer: W) -> Result<Self> {
        let mut inner = tsv(writer);
        inner.write_record(&SUMMARY_HEADER)?;
        Ok(SummaryWriter { inner })
    }

    pub fn write(&mut self, summary: &TranscriptSummary) -> Result<()> {
        let longest = match summary.longest {
            Some(true) => "yes",
            Some(false) => "no",
            None => ".",
        };
        self.inner.write_record(&[
            summary.transcript.clone(),
            summary.gene_id.clone().unwrap_or_else(|| ".".to_owned()),
            summary.cds_len.to_string(),
            summary.mrna_len.to_string(),
            longest.to_owned(),
            summary.tally.zero.to_string(),
            summary.tally.two.to_string(),
            summary.tally.three.to_string(),
            summary.tally.four.to_string(),
        ])?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Per-transcript polymorphism and divergence counts.
pub struct MkWriter<W: io::Write> {
    inner: csv::Writer<W>,
}

impl MkWriter<File> {
    pub fn to_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        MkWriter::new(File::create(path)?)
    }
}

impl<W: io::Write> MkWriter<W> {
    pub fn new(writer: W) -> Result<Self> {
        let mut inner = tsv(writer);
        inner.write_record(&MK_HEADER)?;
        Ok(MkWriter { inner })
    }

    pub fn write(&mut self, transcript: &str, count: &SubstitutionCount) -> Result<()> {
        self.inner.write_record(&[
            transcript.to_owned(),
            count.pn.to_string(),
            count.ps.to_string(),
            count.dn.to_string(),
            count.ds.to_string(),
        ])?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}
