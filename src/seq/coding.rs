use std::collections::HashMap;

use crate::error::TranscriptError;
use crate::gene::{Pos, Strand, Transcript};
use crate::seq::{self, DnaSeq};

/// Bidirectional map between CDS offsets (0-based) and genome positions (1-based).
#[derive(Debug, Clone, Default)]
pub struct CoordinateMap {
    forward: Vec<Pos>,
    inverse: HashMap<Pos, usize>,
}

impl CoordinateMap {
    pub fn with_capacity(n: usize) -> CoordinateMap {
        CoordinateMap {
            forward: Vec::with_capacity(n),
            inverse: HashMap::with_capacity(n),
        }
    }

    /// Map the next CDS offset to `genome_pos`.
    pub fn push(&mut self, genome_pos: Pos) {
        let cds_offset = self.forward.len();
        self.forward.push(genome_pos);
        self.inverse.insert(genome_pos, cds_offset);
    }

    #[inline]
    pub fn genome_pos(&self, cds_offset: usize) -> Option<Pos> {
        self.forward.get(cds_offset).cloned()
    }

    #[inline]
    pub fn cds_offset(&self, genome_pos: Pos) -> Option<usize> {
        self.inverse.get(&genome_pos).cloned()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

/// Spliced coding sequence of a transcript, in the direction of transcription.
#[derive(Debug, Clone)]
pub struct CodingSequence {
    pub seq: DnaSeq,
    pub map: CoordinateMap,
}

/// Assemble the coding sequence of `transcript` from the sequence of its region.
///
/// Exons are sorted into transcription order, and the first exon determines
/// the coding start and the starting frame of the transcript. On the minus
/// strand, each exon is reverse complemented and its genome positions are
/// paired with CDS offsets in reverse.
pub fn assemble(transcript: &mut Transcript, region_seq: &[u8]) -> Result<CodingSequence, TranscriptError> {
    transcript.validate()?;
    transcript.sort_exons();

    let reverse = transcript.strand == Strand::Reverse;
    {
        let first = &transcript.exons[0];
        transcript.coding_start = Some(if reverse { first.end } else { first.start });
        transcript.start_frame = first.phase;
    }

    let n: u64 = transcript.exons.iter().map(|e| e.len()).sum();
    let mut seq: DnaSeq = Vec::with_capacity(n as usize);
    let mut map = CoordinateMap::with_capacity(n as usize);

    for exon in transcript.exons.iter() {
        if exon.start == 0 || exon.end < exon.start || exon.end as usize > region_seq.len() {
            return Err(TranscriptError::ExonOutOfBounds {
                start: exon.start,
                end: exon.end,
                len: region_seq.len(),
            });
        }

        // 1-based closed to 0-based half-open
        let mut exon_seq = region_seq[(exon.start - 1) as usize..exon.end as usize].to_vec();
        if reverse {
            seq::reverse_complement(&mut exon_seq);
            for pos in (exon.start..=exon.end).rev() {
                map.push(pos);
            }
        } else {
            for pos in exon.start..=exon.end {
                map.push(pos);
            }
        }
        seq.extend(exon_seq.iter().map(|x| x.to_ascii_uppercase()));
    }

    transcript.cds_len = seq.len() as u64;

    Ok(CodingSequence { seq, map })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gene::Exon;

    const GENOME: &[u8] = b"ACGTACGTACGTACGT";

    fn transcript(strand: Strand, exons: &[(Pos, Pos, Option<u8>)]) -> Transcript {
        let mut t = Transcript::new("t1", "g1", "chr1", 1, GENOME.len() as Pos, strand);
        for &(start, end, phase) in exons {
            t.add_exon(Exon { start, end, strand, phase });
        }
        t
    }

    #[test]
    fn test_single_exon_forward() {
        let mut t = transcript(Strand::Forward, &[(1, 9, Some(0))]);
        let cds = assemble(&mut t, GENOME).unwrap();
        assert_eq!(cds.seq, b"ACGTACGTA".to_vec());
        assert_eq!(cds.map.len(), 9);
        for i in 0..9 {
            assert_eq!(cds.map.genome_pos(i), Some(i as Pos + 1));
        }
        assert_eq!(t.coding_start, Some(1));
        assert_eq!(t.start_frame, Some(0));
        assert_eq!(t.cds_len, 9);
    }

    #[test]
    fn test_single_exon_reverse() {
        let mut t = transcript(Strand::Reverse, &[(3, 8, Some(1))]);
        let cds = assemble(&mut t, GENOME).unwrap();

        let mut expected = GENOME[2..8].to_vec();
        seq::reverse_complement(&mut expected);
        assert_eq!(cds.seq, expected);
        assert_eq!(cds.map.genome_pos(0), Some(8));
        assert_eq!(cds.map.genome_pos(5), Some(3));
        assert_eq!(t.coding_start, Some(8));
        assert_eq!(t.start_frame, Some(1));
    }

    #[test]
    fn test_multi_exon_reverse() {
        // exons given out of order
        let mut t = transcript(Strand::Reverse, &[(2, 4, Some(0)), (10, 12, Some(2))]);
        let cds = assemble(&mut t, GENOME).unwrap();

        // exon 10-12 (CGT) comes first on the minus strand, then 2-4 (CGT)
        assert_eq!(cds.seq, b"ACGACG".to_vec());
        let positions: Vec<Pos> = (0..6).map(|i| cds.map.genome_pos(i).unwrap()).collect();
        assert_eq!(positions, vec![12, 11, 10, 4, 3, 2]);
        assert_eq!(t.coding_start, Some(12));
        assert_eq!(t.start_frame, Some(2));
    }

    #[test]
    fn test_coordinate_round_trip() {
        let mut t = transcript(Strand::Forward, &[(9, 14, Some(0)), (1, 3, Some(0))]);
        let cds = assemble(&mut t, GENOME).unwrap();
        assert_eq!(cds.seq.len(), 9);
        for x in 0..cds.map.len() {
            let g = cds.map.genome_pos(x).unwrap();
            assert_eq!(cds.map.cds_offset(g), Some(x));
        }
        assert_eq!(cds.map.cds_offset(5), None);
        assert_eq!(cds.map.genome_pos(9), None);
    }

    #[test]
    fn test_lowercase_is_upper_cased() {
        let mut t = transcript(Strand::Forward, &[(1, 3, Some(0))]);
        let cds = assemble(&mut t, b"acgtacgt").unwrap();
        assert_eq!(cds.seq, b"ACG".to_vec());
    }

    #[test]
    fn test_failures() {
        let mut t = transcript(Strand::Forward, &[]);
        assert_eq!(assemble(&mut t, GENOME).unwrap_err(), TranscriptError::NoCodingExons);

        let mut t = transcript(Strand::Forward, &[(1, 3, Some(0))]);
        t.exons[0].strand = Strand::Reverse;
        assert_eq!(assemble(&mut t, GENOME).unwrap_err(), TranscriptError::MixedStrands);

        let mut t = transcript(Strand::Forward, &[(10, 20, Some(0))]);
        assert_eq!(
            assemble(&mut t, GENOME).unwrap_err(),
            TranscriptError::ExonOutOfBounds { start: 10, end: 20, len: 16 }
        );
    }
}
