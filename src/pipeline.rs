use std::collections::HashMap;
use std::io;

use rayon::prelude::*;

use crate::config::{Config, Input};
use crate::constants::*;
use crate::error::{Error, Result, TranscriptError};
use crate::gene::{Annotation, Strand};
use crate::io::fasta;
use crate::io::gxf;
use crate::io::output::{MkWriter, SiteWriter, SummaryWriter, TranscriptSummary};
use crate::io::snv::VariantTable;
use crate::mutation::degeneracy::{self, Classification};
use crate::mutation::substitution;
use crate::mutation::{DegeneracyTally, SubstitutionCount, VariantLookup};
use crate::seq::coding::{self, CodingSequence, CoordinateMap};
use crate::seq::{CodonGraph, CodonTable};
use crate::site::{self, SiteLocator, SiteRow};

/// Shared, read-only state for classifying transcripts.
pub struct Context {
    pub table: CodonTable,
    pub graph: CodonGraph,
    pub variants: Option<VariantTable>,
}

impl Context {
    pub fn new(table: CodonTable, variants: Option<VariantTable>) -> Context {
        Context {
            table,
            graph: CodonGraph::new(),
            variants,
        }
    }
}

/// One coding sequence ready for classification.
#[derive(Debug, Clone)]
pub struct TranscriptJob {
    pub id: String,
    pub gene_id: Option<String>,
    /// Genomic region; absent for coding sequence input
    pub region: Option<String>,
    pub reverse: bool,
    /// Leading bases before the first complete codon
    pub frame: usize,
    pub cds: CodingSequence,
    pub mrna_len: u64,
    pub longest: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct TranscriptResult {
    pub rows: Vec<SiteRow>,
    pub summary: TranscriptSummary,
    pub mk: Option<SubstitutionCount>,
}

/// Totals over a run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    pub transcripts: usize,
    pub sites: usize,
    pub tally: DegeneracyTally,
    pub mk: Option<SubstitutionCount>,
    pub warnings: usize,
}

/// Counter for recoverable problems, each reported once.
#[derive(Debug, Default)]
struct Warnings {
    n: usize,
}

impl Warnings {
    fn transcript(&mut self, id: &str, err: &TranscriptError) {
        log::warn!("transcript {} {} and will be excluded from all calculations", id, err);
        self.n += 1;
    }
}

/// Sum the substitution counts over all complete codons.
fn count_substitutions<L: VariantLookup>(id: &str, classification: &Classification, lookup: &L, ctx: &Context) -> SubstitutionCount {
    let mut count = SubstitutionCount::default();
    for (offset, codon) in classification.codons() {
        let variants = lookup.variants(id, offset, &codon);
        if !variants.is_empty() {
            count += substitution::classify(&codon, &variants, &ctx.table, &ctx.graph);
        }
    }
    count
}

/// Classify one transcript.
pub fn process(job: &TranscriptJob, ctx: &Context) -> TranscriptResult {
    let classification = degeneracy::classify(&job.cds.seq, job.frame, &ctx.table);

    let locator = match job.region {
        Some(ref region) => SiteLocator::Genome { region: region.as_str(), map: &job.cds.map },
        None => SiteLocator::Cds,
    };
    let rows = site::emit_all(&classification.sites, &job.id, locator, job.reverse, &ctx.table);

    let mk = ctx.variants.as_ref().map(|variants| match job.region {
        Some(ref region) => {
            let lookup = variants.on_genome(region, &job.cds.map, job.reverse);
            count_substitutions(&job.id, &classification, &lookup, ctx)
        },
        None => count_substitutions(&job.id, &classification, variants, ctx),
    });

    let summary = TranscriptSummary {
        transcript: job.id.clone(),
        gene_id: job.gene_id.clone(),
        cds_len: job.cds.seq.len() as u64,
        mrna_len: job.mrna_len,
        longest: job.longest,
        tally: classification.tally,
    };

    TranscriptResult { rows, summary, mk }
}

/// Assemble the coding sequences of all annotated transcripts.
///
/// Transcripts that cannot be assembled, have no known frame, or do not end
/// on a complete codon are reported and removed from the annotation. Longest
/// isoforms are marked among the remaining transcripts.
pub fn annotation_jobs(
    annotation: &mut Annotation,
    genome: &HashMap<String, Vec<u8>>,
    warnings: &mut usize,
) -> Result<Vec<TranscriptJob>> {
    let mut counter = Warnings::default();

    for region in annotation.regions() {
        if !genome.contains_key(region) {
            return Err(Error::MissingRegion(region.to_owned()));
        }
    }

    let mut assembled: Vec<(String, usize, CodingSequence)> = Vec::with_capacity(annotation.len());
    for id in annotation.ids() {
        let result = match annotation.get_mut(&id) {
            Some(transcript) => {
                let region_seq = genome.get(&transcript.region).map(|x| x.as_slice()).unwrap_or(&[]);
                coding::assemble(transcript, region_seq).and_then(|cds| {
                    let frame = transcript.start_frame.ok_or(TranscriptError::UnknownFrame)? as usize;
                    let len = cds.seq.len();
                    if frame > len || (len - frame) % CODON_LEN != 0 {
                        return Err(TranscriptError::IncompleteCodon { len, frame });
                    }
                    Ok((frame, cds))
                })
            },
            None => continue,
        };
        match result {
            Ok((frame, cds)) => assembled.push((id, frame, cds)),
            Err(err) => {
                counter.transcript(&id, &err);
                annotation.remove(&id);
            },
        }
    }
    *warnings += counter.n;

    annotation.mark_longest_isoforms();

    let mut jobs = Vec::with_capacity(assembled.len());
    for (id, frame, cds) in assembled {
        if let Some(t) = annotation.get(&id) {
            jobs.push(TranscriptJob {
                id,
                gene_id: Some(t.gene_id.clone()),
                region: Some(t.region.clone()),
                reverse: t.strand == Strand::Reverse,
                frame,
                cds,
                mrna_len: t.mrna_len(),
                longest: Some(t.longest),
            });
        }
    }
    Ok(jobs)
}

/// Wrap in-frame coding sequences as jobs; sequences that do not end on a
/// complete codon are reported and skipped.
pub fn cds_jobs(records: Vec<(String, Vec<u8>)>, warnings: &mut usize) -> Vec<TranscriptJob> {
    let mut counter = Warnings::default();
    let mut jobs = Vec::with_capacity(records.len());
    for (id, seq) in records {
        let len = seq.len();
        if len % CODON_LEN != 0 {
            counter.transcript(&id, &TranscriptError::IncompleteCodon { len, frame: 0 });
            continue;
        }
        jobs.push(TranscriptJob {
            id,
            gene_id: None,
            region: None,
            reverse: false,
            frame: 0,
            cds: CodingSequence { seq, map: CoordinateMap::default() },
            mrna_len: len as u64,
            longest: None,
        });
    }
    *warnings += counter.n;
    jobs
}

/// Write extracted coding sequences, trimmed to complete codons.
fn extract(jobs: &[TranscriptJob], config: &Config, table: &CodonTable) -> Result<()> {
    let outputs = [
        (&config.extract.cds, false, false),
        (&config.extract.cds_aa, false, true),
        (&config.extract.longest, true, false),
        (&config.extract.longest_aa, true, true),
    ];
    for &(path, longest_only, translate) in outputs.iter() {
        let path = match *path {
            Some(ref path) => path,
            None => continue,
        };
        log::info!("writing {} sequences to {}", if translate { "protein" } else { "coding" }, path.display());
        let mut writer = fasta::Writer::to_file(path)?;
        let mut n = 0;
        for job in jobs.iter().filter(|j| !longest_only || j.longest == Some(true)) {
            let seq = &job.cds.seq[job.frame..];
            if translate {
                writer.write(&job.id, &table.translate(seq))?;
            } else {
                writer.write(&job.id, seq)?;
            }
            n += 1;
        }
        writer.flush()?;
        log::info!("wrote {} sequences", n);
    }
    Ok(())
}

fn load_codon_table(config: &Config) -> Result<CodonTable> {
    match config.codon_table {
        Some(ref path) => {
            log::info!("reading codon table from {}", path.display());
            CodonTable::from_reader(crate::io::open(path)?)
        },
        None => Ok(CodonTable::standard()),
    }
}

fn thread_pool(threads: usize) -> Result<Option<rayon::ThreadPool>> {
    if threads <= 1 {
        return Ok(None);
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map(Some)
        .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::Other, e.to_string())))
}

/// Run degeneracy classification for all inputs named by `config`.
pub fn run(config: &Config) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    config.prepare_outdir()?;
    let table = load_codon_table(config)?;

    let jobs = match config.input {
        Input::Annotation { ref annotation, format, ref genome } => {
            log::info!("reading annotation {}", annotation.display());
            let (mut transcripts, stats) = gxf::read_file(annotation, format, config.min_len)?;
            summary.warnings += stats.short;
            log::info!("read {} transcripts with {} coding exons", stats.transcripts, stats.cds);

            log::info!("reading genome {}", genome.display());
            let seqs = fasta::read_genome(genome, config.delim())?;
            log::info!("read {} sequences", seqs.len());

            log::info!("extracting coding sequences");
            let jobs = annotation_jobs(&mut transcripts, &seqs, &mut summary.warnings)?;
            log::info!("extracted {} coding sequences", jobs.len());
            jobs
        },
        Input::Cds(ref path) => {
            log::info!("reading coding sequences from {}", path.display());
            let records = fasta::read_cds(path, config.delim())?;
            log::info!("read {} sequences", records.len());
            cds_jobs(records, &mut summary.warnings)
        },
    };

    if config.extract.is_requested() {
        extract(&jobs, config, &table)?;
        summary.transcripts = jobs.len();
        log::info!("done with {} warnings", summary.warnings);
        return Ok(summary);
    }

    let variants = match config.variants {
        Some(ref path) => {
            log::info!("reading variants from {}", path.display());
            let variants = VariantTable::from_file(path)?;
            if variants.is_empty() {
                log::warn!("no variants read from {}; all MK counts will be zero", path.display());
            } else {
                log::info!("read {} variants", variants.len());
            }
            Some(variants)
        },
        None => None,
    };
    let ctx = Context::new(table, variants);

    let mut sites = SiteWriter::to_file(config.sites_path())?;
    let mut summaries = SummaryWriter::to_file(config.summary_path())?;
    let mut mk = match ctx.variants {
        Some(_) => Some(MkWriter::to_file(config.mk_path())?),
        None => None,
    };

    let pool = thread_pool(config.threads)?;
    log::info!("classifying {} transcripts with {} thread(s)", jobs.len(), config.threads);

    for batch in jobs.chunks(BATCH_SIZE) {
        let results: Vec<TranscriptResult> = match pool {
            Some(ref pool) => pool.install(|| batch.par_iter().map(|job| process(job, &ctx)).collect()),
            None => batch.iter().map(|job| process(job, &ctx)).collect(),
        };

        for result in results {
            for row in result.rows.iter() {
                sites.write(row)?;
            }
            summaries.write(&result.summary)?;
            if let (Some(writer), Some(count)) = (mk.as_mut(), result.mk) {
                writer.write(&result.summary.transcript, &count)?;
                *summary.mk.get_or_insert_with(SubstitutionCount::default) += count;
            }
            summary.transcripts += 1;
            summary.sites += result.rows.len();
            summary.tally += result.summary.tally;
        }
    }

    sites.flush()?;
    summaries.flush()?;
    if let Some(ref mut writer) = mk {
        writer.flush()?;
    }

    log::info!(
        "classified {} sites in {} transcripts: {} 0-fold, {} 2-fold, {} 3-fold, {} 4-fold",
        summary.sites, summary.transcripts,
        summary.tally.zero, summary.tally.two, summary.tally.three, summary.tally.four
    );
    log::info!("done with {} warnings", summary.warnings);

    Ok(summary)
}
