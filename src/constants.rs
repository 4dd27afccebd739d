pub const NUCLEOTIDES: [u8; 4] = [b'A', b'C', b'G', b'T'];
pub const N_NUCLEOTIDES: usize = 4;

pub const CODON_LEN: usize = 3;
pub const N_CODONS: usize = N_NUCLEOTIDES * N_NUCLEOTIDES * N_NUCLEOTIDES;

/// Amino acid reported for codons that contain ambiguous bases
pub const UNKNOWN_RESIDUE: u8 = b'X';

/// Annotation feature types that describe a transcript
pub const TRANSCRIPT_FEATURES: [&str; 4] = ["transcript", "mRNA", "V_gene_segment", "C_gene_segment"];
pub const CDS_FEATURE: &str = "CDS";

pub const FASTA_EXTENSIONS: [&str; 6] = [".fa", ".fa.gz", ".fasta", ".fasta.gz", ".fna", ".fna.gz"];

pub const SITES_FILENAME: &str = "degeneracy-all-sites.bed";
pub const SUMMARY_FILENAME: &str = "degeneracy-transcript-summary.txt";
pub const MK_FILENAME: &str = "mk.tsv";
pub const DEFAULT_OUTDIR: &str = "degenotate-out";

/// Number of transcripts handed to the worker pool at a time
pub const BATCH_SIZE: usize = 256;
