use std::collections::HashSet;

use multimap::MultiMap;

pub use bio_types::strand::Strand;
pub use linked_hash_map::LinkedHashMap;

use crate::error::TranscriptError;

pub type Pos = u64;

/// Coding exon.
/// Positions are 1-based, closed, as in the annotation file.
#[derive(Debug, Clone, PartialEq)]
pub struct Exon {
    /// Genomic start position
    pub start: Pos,
    /// Genomic end position (inclusive)
    pub end: Pos,
    /// Genomic strand
    pub strand: Strand,
    /// Number of nucleotides to remove before the start of the first complete codon
    pub phase: Option<u8>,
}

impl Exon {
    #[inline]
    pub fn len(&self) -> u64 {
        self.end + 1 - self.start
    }
}

/// Transcript.
/// Positions are 1-based, closed.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub id: String,
    pub gene_id: String,
    /// Chromosome or contig name
    pub region: String,
    /// Genomic start position
    pub start: Pos,
    /// Genomic end position
    pub end: Pos,
    /// Genomic strand
    pub strand: Strand,
    /// Coding exons; sorted 5' to 3' once the coding sequence is assembled
    pub exons: Vec<Exon>,
    /// Genomic position of the first coding base
    pub coding_start: Option<Pos>,
    /// Phase of the first coding exon
    pub start_frame: Option<u8>,
    /// Total length of the coding exons
    pub cds_len: u64,
    /// Whether this is the longest isoform of its gene
    pub longest: bool,
}

impl Transcript {
    pub fn new(id: &str, gene_id: &str, region: &str, start: Pos, end: Pos, strand: Strand) -> Transcript {
        Transcript {
            id: id.to_owned(),
            gene_id: gene_id.to_owned(),
            region: region.to_owned(),
            start,
            end,
            strand,
            exons: Vec::new(),
            coding_start: None,
            start_frame: None,
            cds_len: 0,
            longest: false,
        }
    }

    /// Transcript span as reported in the summary (end - start).
    #[inline]
    pub fn mrna_len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn add_exon(&mut self, exon: Exon) {
        self.cds_len += exon.len();
        self.exons.push(exon);
    }

    /// Check that the transcript has coding exons on a single, known strand.
    pub fn validate(&self) -> Result<(), TranscriptError> {
        if self.exons.is_empty() {
            return Err(TranscriptError::NoCodingExons);
        }
        if self.strand.is_unknown() {
            return Err(TranscriptError::UnknownStrand);
        }
        if self.exons.iter().any(|e| e.strand != self.strand) {
            return Err(TranscriptError::MixedStrands);
        }
        Ok(())
    }

    /// Sort exons in the order of transcription.
    pub fn sort_exons(&mut self) {
        if self.strand == Strand::Reverse {
            self.exons.sort_by(|a, b| b.start.cmp(&a.start));
        } else {
            self.exons.sort_by(|a, b| a.start.cmp(&b.start));
        }
    }
}

/// Collection of transcripts in file order, with their grouping into genes.
#[derive(Debug)]
pub struct Annotation {
    pub transcripts: LinkedHashMap<String, Transcript>,
    /// Gene ID to transcript IDs
    genes: MultiMap<String, String>,
}

impl Annotation {
    pub fn new() -> Annotation {
        Annotation {
            transcripts: LinkedHashMap::new(),
            genes: MultiMap::new(),
        }
    }

    pub fn insert(&mut self, transcript: Transcript) {
        self.genes.insert(transcript.gene_id.clone(), transcript.id.clone());
        self.transcripts.insert(transcript.id.clone(), transcript);
    }

    /// Attach a coding exon to its transcript.
    /// Returns false if the transcript is not known.
    pub fn add_exon(&mut self, transcript_id: &str, exon: Exon) -> bool {
        match self.transcripts.get_mut(transcript_id) {
            Some(transcript) => {
                transcript.add_exon(exon);
                true
            },
            None => false,
        }
    }

    pub fn remove(&mut self, transcript_id: &str) -> Option<Transcript> {
        let transcript = self.transcripts.remove(transcript_id)?;
        if let Some(ids) = self.genes.get_vec_mut(&transcript.gene_id) {
            ids.retain(|id| id != transcript_id);
        }
        Some(transcript)
    }

    pub fn get(&self, transcript_id: &str) -> Option<&Transcript> {
        self.transcripts.get(transcript_id)
    }

    pub fn get_mut(&mut self, transcript_id: &str) -> Option<&mut Transcript> {
        self.transcripts.get_mut(transcript_id)
    }

    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.transcripts.keys().cloned().collect()
    }

    /// Names of all regions referenced by transcripts.
    pub fn regions(&self) -> HashSet<&str> {
        self.transcripts.values().map(|t| t.region.as_str()).collect()
    }

    /// Flag the longest isoform of every gene.
    ///
    /// The longest isoform has the longest coding sequence; ties are broken by
    /// the longer transcript span, then by the alphabetically first ID.
    pub fn mark_longest_isoforms(&mut self) {
        let mut winners = Vec::new();
        for (_, ids) in self.genes.iter_all() {
            let mut sorted: Vec<&String> = ids.iter().filter(|id| self.transcripts.contains_key(*id)).collect();
            sorted.sort();

            let mut best: Option<(&String, u64, u64)> = None;
            for id in sorted {
                let t = match self.transcripts.get(id) {
                    Some(t) => t,
                    None => continue,
                };
                let better = match best {
                    None => true,
                    Some((_, cds_len, mrna_len)) => {
                        t.cds_len > cds_len || (t.cds_len == cds_len && t.mrna_len() > mrna_len)
                    },
                };
                if better {
                    best = Some((id, t.cds_len, t.mrna_len()));
                }
            }
            if let Some((id, _, _)) = best {
                winners.push(id.clone());
            }
        }

        for (_, t) in self.transcripts.iter_mut() {
            t.longest = false;
        }
        for id in winners {
            if let Some(t) = self.transcripts.get_mut(&id) {
                t.longest = true;
            }
        }
    }
}
