use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{App, Arg, ArgMatches};
use log::LevelFilter;

use crate::constants::*;
use crate::error::{Error, Result};
use crate::io::gxf::GxfFormat;

/// Source of the coding sequences.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// Transcripts from an annotation, sequences from a genome
    Annotation {
        annotation: PathBuf,
        format: GxfFormat,
        genome: PathBuf,
    },
    /// In-frame coding sequences, from a FASTA file or a directory of them
    Cds(PathBuf),
}

/// FASTA files to write extracted coding sequences to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Extraction {
    pub cds: Option<PathBuf>,
    pub cds_aa: Option<PathBuf>,
    pub longest: Option<PathBuf>,
    pub longest_aa: Option<PathBuf>,
}

impl Extraction {
    pub fn is_requested(&self) -> bool {
        self.cds.is_some() || self.cds_aa.is_some() || self.longest.is_some() || self.longest_aa.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub input: Input,
    /// SNV table for polymorphism and divergence counts
    pub variants: Option<PathBuf>,
    pub outdir: PathBuf,
    pub overwrite: bool,
    pub threads: usize,
    /// Sequence headers are truncated at the first occurrence of this string
    pub delim: Option<String>,
    /// Minimum transcript span
    pub min_len: u64,
    /// Codon table replacing the standard genetic code
    pub codon_table: Option<PathBuf>,
    pub extract: Extraction,
    pub log_level: LevelFilter,
}

pub fn app() -> App<'static, 'static> {
    App::new("degenotate")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Annotation of codon degeneracy for coding sequences")
        .arg(Arg::with_name("annotation")
            .short("a")
            .long("annotation")
            .value_name("GXF")
            .takes_value(true)
            .help("GFF3 or GTF file with the coordinates of transcripts in the genome (-g)"))
        .arg(Arg::with_name("genome")
            .short("g")
            .long("genome")
            .value_name("FASTA")
            .takes_value(true)
            .help("Genome FASTA file; required with -a"))
        .arg(Arg::with_name("seqs")
            .short("s")
            .long("seqs")
            .value_name("PATH")
            .takes_value(true)
            .help("FASTA file, or directory of FASTA files, of in-frame coding sequences"))
        .arg(Arg::with_name("variants")
            .short("v")
            .long("variants")
            .value_name("TSV")
            .takes_value(true)
            .help("SNV table (region, pos, ref, alt, group) for MK test counts"))
        .arg(Arg::with_name("outdir")
            .short("o")
            .long("outdir")
            .value_name("DIR")
            .takes_value(true)
            .default_value(DEFAULT_OUTDIR)
            .help("Output directory"))
        .arg(Arg::with_name("overwrite")
            .long("overwrite")
            .help("Write into an existing output directory"))
        .arg(Arg::with_name("threads")
            .short("p")
            .long("threads")
            .value_name("N")
            .takes_value(true)
            .default_value("1")
            .help("Number of worker threads"))
        .arg(Arg::with_name("delim")
            .short("d")
            .long("delim")
            .value_name("STR")
            .takes_value(true)
            .help("Truncate FASTA headers at this string"))
        .arg(Arg::with_name("min_len")
            .short("m")
            .long("min-length")
            .value_name("BP")
            .takes_value(true)
            .default_value("1")
            .help("Skip transcripts spanning fewer bases"))
        .arg(Arg::with_name("codon_table")
            .short("t")
            .long("codon-table")
            .value_name("CSV")
            .takes_value(true)
            .help("Codon table (codon,degeneracy,amino acid) replacing the standard code"))
        .arg(Arg::with_name("write_cds")
            .short("c")
            .long("write-cds")
            .value_name("FASTA")
            .takes_value(true)
            .help("Write coding sequences of all transcripts and exit"))
        .arg(Arg::with_name("write_cds_aa")
            .long("write-cds-aa")
            .value_name("FASTA")
            .takes_value(true)
            .help("Write translated coding sequences of all transcripts and exit"))
        .arg(Arg::with_name("write_longest")
            .short("l")
            .long("write-longest")
            .value_name("FASTA")
            .takes_value(true)
            .help("Write coding sequences of the longest isoform of each gene and exit"))
        .arg(Arg::with_name("write_longest_aa")
            .long("write-longest-aa")
            .value_name("FASTA")
            .takes_value(true)
            .help("Write translated coding sequences of the longest isoform of each gene and exit"))
        .arg(Arg::with_name("quiet")
            .short("q")
            .long("quiet")
            .conflicts_with("debug")
            .help("Only report warnings and errors"))
        .arg(Arg::with_name("debug")
            .long("debug")
            .help("Report debugging information"))
}

/// Parse a numeric option.
fn number<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T> {
    let x = matches.value_of(name).unwrap_or_default();
    x.parse().map_err(|_| Error::InvalidNumber {
        name: name.to_owned(),
        value: x.to_owned(),
    })
}

impl Config {
    pub fn from_matches(matches: &ArgMatches) -> Result<Config> {
        let path = |name: &str| matches.value_of(name).map(PathBuf::from);

        let input = match (path("annotation"), path("seqs")) {
            (Some(annotation), None) => {
                let genome = path("genome").ok_or(Error::MissingGenome)?;
                let format = GxfFormat::from_path(&annotation)?;
                Input::Annotation { annotation, format, genome }
            },
            (None, Some(seqs)) => Input::Cds(seqs),
            _ => return Err(Error::InputMode),
        };

        let extract = Extraction {
            cds: path("write_cds"),
            cds_aa: path("write_cds_aa"),
            longest: path("write_longest"),
            longest_aa: path("write_longest_aa"),
        };
        if extract.is_requested() {
            if let Input::Cds(_) = input {
                return Err(Error::CdsExtractionMode);
            }
        }

        let log_level = if matches.is_present("quiet") {
            LevelFilter::Warn
        } else if matches.is_present("debug") {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };

        Ok(Config {
            input,
            variants: path("variants"),
            outdir: path("outdir").unwrap_or_else(|| PathBuf::from(DEFAULT_OUTDIR)),
            overwrite: matches.is_present("overwrite"),
            threads: number::<usize>(matches, "threads")?.max(1),
            delim: matches.value_of("delim").map(String::from),
            min_len: number(matches, "min_len")?,
            codon_table: path("codon_table"),
            extract,
            log_level,
        })
    }

    /// Parse a full command line, program name included.
    pub fn from_args<I, T>(args: I) -> Result<Config>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Config::from_matches(&app().get_matches_from(args))
    }

    pub fn sites_path(&self) -> PathBuf {
        self.outdir.join(SITES_FILENAME)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.outdir.join(SUMMARY_FILENAME)
    }

    pub fn mk_path(&self) -> PathBuf {
        self.outdir.join(MK_FILENAME)
    }

    pub fn delim(&self) -> Option<&str> {
        self.delim.as_ref().map(|x| x.as_str())
    }

    /// Create the output directory; an existing one is only reused with `overwrite`.
    pub fn prepare_outdir(&self) -> Result<()> {
        prepare_dir(&self.outdir, self.overwrite)
    }
}

fn prepare_dir(dir: &Path, overwrite: bool) -> Result<()> {
    if dir.exists() {
        if !overwrite {
            return Err(Error::OutputExists(dir.display().to_string()));
        }
        log::debug!("reusing output directory {}", dir.display());
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn test_annotation_input() {
        let config = Config::from_args(vec!["degenotate", "-a", "x.gff3.gz", "-g", "x.fa", "-p", "4", "-d", "|"]).unwrap();
        assert_eq!(
            config.input,
            Input::Annotation {
                annotation: PathBuf::from("x.gff3.gz"),
                format: GxfFormat::Gff3,
                genome: PathBuf::from("x.fa"),
            }
        );
        assert_eq!(config.threads, 4);
        assert_eq!(config.delim(), Some("|"));
        assert_eq!(config.min_len, 1);
        assert_eq!(config.outdir, PathBuf::from(DEFAULT_OUTDIR));
        assert_eq!(config.sites_path(), PathBuf::from(DEFAULT_OUTDIR).join(SITES_FILENAME));
        assert_eq!(config.log_level, LevelFilter::Info);
        assert!(!config.extract.is_requested());
    }

    #[test]
    fn test_cds_input() {
        let config = Config::from_args(vec!["degenotate", "-s", "cds/", "-v", "snv.tsv", "-o", "out", "-q"]).unwrap();
        assert_eq!(config.input, Input::Cds(PathBuf::from("cds/")));
        assert_eq!(config.variants, Some(PathBuf::from("snv.tsv")));
        assert_eq!(config.mk_path(), PathBuf::from("out").join(MK_FILENAME));
        assert_eq!(config.log_level, LevelFilter::Warn);
    }

    #[test]
    fn test_option_errors() {
        let code = |args: Vec<&str>| Config::from_args(args).unwrap_err().code();
        assert_eq!(code(vec!["degenotate"]), "OP1");
        assert_eq!(code(vec!["degenotate", "-a", "x.gtf", "-s", "y.fa"]), "OP1");
        assert_eq!(code(vec!["degenotate", "-a", "x.gtf"]), "OP2");
        assert_eq!(code(vec!["degenotate", "-a", "x.txt", "-g", "x.fa"]), "OP3");
        assert_eq!(code(vec!["degenotate", "-s", "y.fa", "-c", "cds.fa"]), "OP8");
        assert_eq!(code(vec!["degenotate", "-s", "y.fa", "-p", "many"]), "OP4");
        assert_eq!(code(vec!["degenotate", "-s", "y.fa", "-m", "ten"]), "OP4");
    }

    #[test]
    fn test_prepare_outdir() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out");
        prepare_dir(&out, false).unwrap();
        assert!(out.is_dir());
        assert_eq!(prepare_dir(&out, false).unwrap_err().code(), "OP10");
        prepare_dir(&out, true).unwrap();
    }
}
