pub mod codon;
pub mod coding;
pub mod graph;

use std::str;

use bio::alphabets::dna;

use crate::constants::*;

pub use self::codon::{CodonEntry, CodonTable};
pub use self::coding::{CodingSequence, CoordinateMap};
pub use self::graph::CodonGraph;

pub type Nucleotide = u8;
pub type Residue = u8;

pub type Codon = [Nucleotide; CODON_LEN];

pub type DnaSeq = Vec<Nucleotide>;
pub type Peptide = Vec<Residue>;

pub fn complement(x: Nucleotide) -> Nucleotide {
    dna::complement(x)
}

/// Reverse complement sequence in place.
pub fn reverse_complement(seq: &mut DnaSeq) {
    let rc = dna::revcomp(&seq[..]);
    *seq = rc;
}

/// Index of a nucleotide in A, C, G, T order.
#[inline]
pub fn nucleotide_index(x: Nucleotide) -> Option<usize> {
    match x {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' => Some(3),
        _ => None,
    }
}

/// Index of a codon in 0..64; the first base varies slowest.
pub fn codon_index(codon: &[Nucleotide]) -> Option<usize> {
    if codon.len() != CODON_LEN {
        return None;
    }
    let mut idx = 0;
    for &nt in codon {
        idx = idx * N_NUCLEOTIDES + nucleotide_index(nt)?;
    }
    Some(idx)
}

/// Inverse of `codon_index`.
pub fn index_codon(idx: usize) -> Codon {
    assert!(idx < N_CODONS);
    [
        NUCLEOTIDES[idx / 16],
        NUCLEOTIDES[(idx / 4) % 4],
        NUCLEOTIDES[idx % 4],
    ]
}

/// Copy a 3-nucleotide slice into an upper-case codon.
pub fn to_codon(x: &[Nucleotide]) -> Option<Codon> {
    if x.len() != CODON_LEN {
        return None;
    }
    Some([
        x[0].to_ascii_uppercase(),
        x[1].to_ascii_uppercase(),
        x[2].to_ascii_uppercase(),
    ])
}

/// Number of positions at which two codons differ.
pub fn hamming(a: &Codon, b: &Codon) -> usize {
    a.iter().zip(b.iter()).filter(|&(x, y)| x != y).count()
}

pub fn codon_str(codon: &Codon) -> &str {
    str::from_utf8(codon).unwrap_or("???")
}
