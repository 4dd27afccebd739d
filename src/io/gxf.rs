use std::collections::HashSet;
use std::io::{self, BufRead, Read};
use std::path::Path;

use bio::io::gff;

use crate::constants::*;
use crate::error::{Error, Result, TranscriptError};
use crate::gene::{Annotation, Exon, Strand, Transcript};

const FASTA_DIRECTIVE: &[u8] = b"##FASTA";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GxfFormat {
    Gff3,
    Gtf,
}

impl GxfFormat {
    /// Guess the format from the file extension, ignoring a trailing `.gz`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<GxfFormat> {
        let name = path.as_ref().to_string_lossy().to_lowercase();
        let stem = name.trim_end_matches(".gz");
        if stem.ends_with(".gff") || stem.ends_with(".gff3") {
            Ok(GxfFormat::Gff3)
        } else if stem.ends_with(".gtf") {
            Ok(GxfFormat::Gtf)
        } else {
            Err(Error::AnnotationType(path.as_ref().display().to_string()))
        }
    }

    fn gff_type(&self) -> gff::GffType {
        match *self {
            GxfFormat::Gff3 => gff::GffType::GFF3,
            GxfFormat::Gtf => gff::GffType::GTF2,
        }
    }

    fn transcript_id_key(&self) -> &'static str {
        match *self {
            GxfFormat::Gff3 => "ID",
            GxfFormat::Gtf => "transcript_id",
        }
    }

    fn gene_id_key(&self) -> &'static str {
        match *self {
            GxfFormat::Gff3 => "Parent",
            GxfFormat::Gtf => "gene_id",
        }
    }

    fn cds_parent_key(&self) -> &'static str {
        match *self {
            GxfFormat::Gff3 => "Parent",
            GxfFormat::Gtf => "transcript_id",
        }
    }
}

/// Counts collected while reading an annotation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReadStats {
    pub transcripts: usize,
    pub cds: usize,
    /// Transcripts skipped for being shorter than the minimum length
    pub short: usize,
}

/// Annotation lines up to an embedded `##FASTA` section.
struct FeatureLines<R: BufRead> {
    inner: R,
    line: Vec<u8>,
    pos: usize,
    done: bool,
}

impl<R: BufRead> FeatureLines<R> {
    fn new(inner: R) -> Self {
        FeatureLines {
            inner,
            line: Vec::new(),
            pos: 0,
            done: false,
        }
    }
}

impl<R: BufRead> Read for FeatureLines<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos == self.line.len() {
            self.line.clear();
            self.pos = 0;
            if self.done {
                return Ok(0);
            }
            if self.inner.read_until(b'\n', &mut self.line)? == 0 || self.line.starts_with(FASTA_DIRECTIVE) {
                self.line.clear();
                self.done = true;
                return Ok(0);
            }
        }
        let n = buf.len().min(self.line.len() - self.pos);
        buf[..n].copy_from_slice(&self.line[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

fn parse_phase(x: &str) -> Option<u8> {
    match x {
        "0" => Some(0),
        "1" => Some(1),
        "2" => Some(2),
        _ => None,
    }
}

fn describe(record: &gff::Record) -> String {
    format!("{} {}:{}-{}", record.feature_type(), record.seqname(), record.start(), record.end())
}

/// The single value of attribute `key`.
fn single(record: &gff::Record, key: &str, step: &str) -> Result<String> {
    let values = record.attributes().get_vec(key).map(|v| v.as_slice()).unwrap_or(&[]);
    if values.len() != 1 {
        return Err(Error::AmbiguousId {
            step: step.to_owned(),
            count: values.len(),
            line: describe(record),
        });
    }
    Ok(values[0].clone())
}

/// Read transcripts and their coding exons.
///
/// Reading stops at a `##FASTA` line. Transcripts shorter than `min_len` are
/// reported and skipped together with their coding exons; coding exons of
/// unknown transcripts are ignored. Longest isoforms are not marked here.
pub fn read<R: BufRead>(reader: R, format: GxfFormat, min_len: u64) -> Result<(Annotation, ReadStats)> {
    let mut annotation = Annotation::new();
    let mut stats = ReadStats::default();
    let mut short: HashSet<String> = HashSet::new();
    let mut cds: Vec<(String, Exon)> = Vec::new();

    let mut gff = gff::Reader::new(FeatureLines::new(reader), format.gff_type());
    for r in gff.records() {
        let record = r.map_err(|e| {
            if e.is_io_error() {
                Error::Csv(e)
            } else {
                Error::Annotation(e.to_string())
            }
        })?;

        let (start, end) = (*record.start(), *record.end());
        if start == 0 || end < start {
            return Err(Error::Annotation(format!("invalid interval in {}", describe(&record))));
        }
        let strand = record.strand().unwrap_or(Strand::Unknown);

        if TRANSCRIPT_FEATURES.contains(&record.feature_type()) {
            let gene_id = single(&record, format.gene_id_key(), "transcript parent id parsing")?;
            let id = single(&record, format.transcript_id_key(), "transcript id parsing")?;
            let len = end - start;
            if len < min_len {
                log::warn!("transcript {} {}", id, TranscriptError::TooShort { len, min: min_len });
                stats.short += 1;
                short.insert(id);
                continue;
            }
            annotation.insert(Transcript::new(&id, &gene_id, record.seqname(), start, end, strand));
            stats.transcripts += 1;
        } else if record.feature_type() == CDS_FEATURE {
            let parent = single(&record, format.cds_parent_key(), "CDS parent id parsing")?;
            let exon = Exon {
                start,
                end,
                strand,
                phase: parse_phase(record.frame()),
            };
            cds.push((parent, exon));
        }
    }

    for (parent, exon) in cds {
        if short.contains(&parent) {
            continue;
        }
        if annotation.add_exon(&parent, exon) {
            stats.cds += 1;
        } else {
            log::debug!("ignoring CDS of unknown transcript {}", parent);
        }
    }

    if stats.cds == 0 {
        return Err(Error::NoCodingExons);
    }

    Ok((annotation, stats))
}

/// Read an annotation file, plain or gzip-compressed.
pub fn read_file<P: AsRef<Path>>(path: P, format: GxfFormat, min_len: u64) -> Result<(Annotation, ReadStats)> {
    let reader = super::open(&path)?;
    read(reader, format, min_len)
}
