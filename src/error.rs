use std::io;
use std::result;

use thiserror::Error;

/// Fatal errors. Each one carries a short code that is printed with the message.
#[derive(Debug, Error)]
pub enum Error {
    #[error("one input method must be specified: -a/-g or -s")]
    InputMode,

    #[error("a genome fasta file must be specified with -g when an annotation file is given with -a")]
    MissingGenome,

    #[error("cannot guess annotation file type from extension of {0}; make sure it ends with .gff, .gff3 or .gtf")]
    AnnotationType(String),

    #[error("invalid value for {name}: {value}")]
    InvalidNumber { name: String, value: String },

    #[error("extracting CDS sequences can only be done with an annotation file (-a) and a genome file (-g)")]
    CdsExtractionMode,

    #[error("output path already exists: {0}; specify a new name or set --overwrite")]
    OutputExists(String),

    #[error("invalid number of IDs ({count}) found during {step}: {line}")]
    AmbiguousId {
        step: String,
        count: usize,
        line: String,
    },

    #[error("no CDS exons found in annotation file; cannot calculate degeneracy without coding sequences")]
    NoCodingExons,

    #[error("malformed annotation: {0}")]
    Annotation(String),

    #[error("region in annotation file not found in genome file: {0}; headers can be trimmed with -d")]
    MissingRegion(String),

    #[error("no files in {0} have extensions indicating they are FASTA files")]
    NoFastaFiles(String),

    #[error("no FASTA sequences were read from input")]
    NoSequences,

    #[error("invalid codon table: {0}")]
    CodonTable(String),

    #[error("malformed variant table: {0}")]
    Variants(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Short, stable code identifying the error class.
    pub fn code(&self) -> &'static str {
        match *self {
            Error::InputMode => "OP1",
            Error::MissingGenome => "OP2",
            Error::AnnotationType(_) => "OP3",
            Error::InvalidNumber { .. } => "OP4",
            Error::CdsExtractionMode => "OP8",
            Error::OutputExists(_) => "OP10",
            Error::AmbiguousId { .. } => "GXF1",
            Error::NoCodingExons => "GXF2",
            Error::Annotation(_) => "GXF3",
            Error::MissingRegion(_) => "SEQ1",
            Error::NoFastaFiles(_) => "SEQ2",
            Error::NoSequences => "SEQ3",
            Error::CodonTable(_) => "CT1",
            Error::Variants(_) => "SNV1",
            Error::Io(_) => "IO1",
            Error::Csv(_) => "IO2",
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Problems that exclude one transcript from all downstream output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptError {
    #[error("has a length shorter than the minimum ({len} < {min})")]
    TooShort { len: u64, min: u64 },

    #[error("has no coding exons associated with it")]
    NoCodingExons,

    #[error("has no usable strand")]
    UnknownStrand,

    #[error("contains exons annotated on differing strands")]
    MixedStrands,

    #[error("has an exon ({start}-{end}) beyond the end of its region ({len} bp)")]
    ExonOutOfBounds { start: u64, end: u64, len: usize },

    #[error("has an unknown frame")]
    UnknownFrame,

    #[error("is not a multiple of three after removing {frame} leading bases (length {len})")]
    IncompleteCodon { len: usize, frame: usize },
}

/// Codon containing characters outside of A, C, G and T.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown codon {}", String::from_utf8_lossy(.0))]
pub struct UnknownCodon(pub [u8; 3]);
