use std::fmt;
use std::ops;

use crate::constants::*;
use crate::seq::{Codon, CodonTable, Nucleotide, Residue};

/// Degeneracy class of one coding position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Degeneracy {
    /// Number of nucleotides at this position encoding the same amino acid (0, 2, 3 or 4)
    Fold(u8),
    /// Out-of-frame base or codon with an ambiguous base
    Unknown,
}

impl fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Degeneracy::Fold(d) => write!(f, "{}", d),
            Degeneracy::Unknown => write!(f, "."),
        }
    }
}

/// Count of sites per degeneracy class.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DegeneracyTally {
    pub zero: u64,
    pub two: u64,
    pub three: u64,
    pub four: u64,
}

impl DegeneracyTally {
    pub fn add(&mut self, degeneracy: Degeneracy) {
        match degeneracy {
            Degeneracy::Fold(0) => self.zero += 1,
            Degeneracy::Fold(2) => self.two += 1,
            Degeneracy::Fold(3) => self.three += 1,
            Degeneracy::Fold(4) => self.four += 1,
            _ => {},
        }
    }

    pub fn total(&self) -> u64 {
        self.zero + self.two + self.three + self.four
    }
}

impl ops::AddAssign for DegeneracyTally {
    fn add_assign(&mut self, other: DegeneracyTally) {
        self.zero += other.zero;
        self.two += other.two;
        self.three += other.three;
        self.four += other.four;
    }
}

/// One position of a coding sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct Site {
    /// Position in the coding sequence (0-based)
    pub cds_offset: usize,
    /// Reference nucleotide
    pub base: Nucleotide,
    /// Enclosing codon; absent for bases outside a complete codon
    pub codon: Option<Codon>,
    /// Position within the codon (0, 1 or 2)
    pub codon_pos: Option<usize>,
    /// Amino acid encoded by the codon
    pub amino_acid: Option<Residue>,
    pub degeneracy: Degeneracy,
}

impl Site {
    fn placeholder(cds_offset: usize, base: Nucleotide) -> Site {
        Site {
            cds_offset,
            base,
            codon: None,
            codon_pos: None,
            amino_acid: None,
            degeneracy: Degeneracy::Unknown,
        }
    }
}

/// Per-position degeneracy of a coding sequence.
#[derive(Clone, Debug)]
pub struct Classification {
    /// One site per position of the full coding sequence
    pub sites: Vec<Site>,
    pub tally: DegeneracyTally,
    /// Number of bases before the first complete codon
    pub leading: usize,
    /// Number of bases after the last complete codon
    pub trailing: usize,
}

impl Classification {
    /// Complete codons with the CDS offset of their first base.
    pub fn codons<'a>(&'a self) -> impl Iterator<Item = (usize, Codon)> + 'a {
        self.sites
            .iter()
            .filter(|s| s.codon_pos == Some(0))
            .filter_map(|s| s.codon.map(|c| (s.cds_offset, c)))
    }

    pub fn n_codons(&self) -> usize {
        (self.sites.len() - self.leading - self.trailing) / CODON_LEN
    }
}

/// Classify every position of `cds`.
///
/// `frame` is the number of leading bases to skip before the first complete
/// codon. Leading and trailing bases that do not belong to a complete codon are
/// reported with unknown degeneracy, as are all positions of codons with
/// ambiguous bases. The degeneracy of every other position is taken from the
/// codon table.
pub fn classify(cds: &[Nucleotide], frame: usize, table: &CodonTable) -> Classification {
    let n = cds.len();
    let leading = frame.min(n);
    let trailing = (n - leading) % CODON_LEN;

    let mut sites = Vec::with_capacity(n);
    let mut tally = DegeneracyTally::default();

    for (i, &base) in cds[..leading].iter().enumerate() {
        sites.push(Site::placeholder(i, base));
    }

    for (k, chunk) in cds[leading..n - trailing].chunks_exact(CODON_LEN).enumerate() {
        let start = leading + k * CODON_LEN;
        let codon = [chunk[0], chunk[1], chunk[2]];
        let (amino_acid, degeneracy) = match table.lookup(&codon) {
            Ok(entry) => (entry.amino_acid, Some(entry.degeneracy)),
            Err(_) => (UNKNOWN_RESIDUE, None),
        };
        for pos in 0..CODON_LEN {
            let d = match degeneracy {
                Some(digits) => Degeneracy::Fold(digits[pos]),
                None => Degeneracy::Unknown,
            };
            tally.add(d);
            sites.push(Site {
                cds_offset: start + pos,
                base: codon[pos],
                codon: Some(codon),
                codon_pos: Some(pos),
                amino_acid: Some(amino_acid),
                degeneracy: d,
            });
        }
    }

    for i in (n - trailing)..n {
        sites.push(Site::placeholder(i, cds[i]));
    }

    Classification { sites, tally, leading, trailing }
}

/// Substitutions at `codon_pos` that change the amino acid, as `(new base, new amino acid)`.
pub fn amino_acid_changes(table: &CodonTable, codon: &Codon, codon_pos: usize) -> Vec<(Nucleotide, Residue)> {
    let aa = match table.amino_acid(codon) {
        Some(aa) => aa,
        None => return Vec::new(),
    };
    let mut changes = Vec::new();
    for &nt in NUCLEOTIDES.iter() {
        if nt == codon[codon_pos] {
            continue;
        }
        let mut alt = *codon;
        alt[codon_pos] = nt;
        if let Some(alt_aa) = table.amino_acid(&alt) {
            if alt_aa != aa {
                changes.push((nt, alt_aa));
            }
        }
    }
    changes
}
