use std::io;

use crate::constants::*;
use crate::error::{Error, Result, UnknownCodon};
use crate::seq::{self, Codon, Nucleotide, Peptide, Residue};

/// Standard genetic code with per-position degeneracy.
///
/// Each degeneracy digit is the number of nucleotides at that position that,
/// holding the other two positions fixed, encode the same amino acid.
/// A count of one (only the reference nucleotide) is written as 0.
#[rustfmt::skip]
static STANDARD: [(&[u8; 3], u8, &[u8; 3]); N_CODONS] = [
    (b"AAA", b'K', b"002"), (b"AAC", b'N', b"002"), (b"AAG", b'K', b"002"), (b"AAT", b'N', b"002"),
    (b"ACA", b'T', b"004"), (b"ACC", b'T', b"004"), (b"ACG", b'T', b"004"), (b"ACT", b'T', b"004"),
    (b"AGA", b'R', b"202"), (b"AGC", b'S', b"002"), (b"AGG", b'R', b"202"), (b"AGT", b'S', b"002"),
    (b"ATA", b'I', b"003"), (b"ATC", b'I', b"003"), (b"ATG", b'M', b"000"), (b"ATT", b'I', b"003"),
    (b"CAA", b'Q', b"002"), (b"CAC", b'H', b"002"), (b"CAG", b'Q', b"002"), (b"CAT", b'H', b"002"),
    (b"CCA", b'P', b"004"), (b"CCC", b'P', b"004"), (b"CCG", b'P', b"004"), (b"CCT", b'P', b"004"),
    (b"CGA", b'R', b"204"), (b"CGC", b'R', b"004"), (b"CGG", b'R', b"204"), (b"CGT", b'R', b"004"),
    (b"CTA", b'L', b"204"), (b"CTC", b'L', b"004"), (b"CTG", b'L', b"204"), (b"CTT", b'L', b"004"),
    (b"GAA", b'E', b"002"), (b"GAC", b'D', b"002"), (b"GAG", b'E', b"002"), (b"GAT", b'D', b"002"),
    (b"GCA", b'A', b"004"), (b"GCC", b'A', b"004"), (b"GCG", b'A', b"004"), (b"GCT", b'A', b"004"),
    (b"GGA", b'G', b"004"), (b"GGC", b'G', b"004"), (b"GGG", b'G', b"004"), (b"GGT", b'G', b"004"),
    (b"GTA", b'V', b"004"), (b"GTC", b'V', b"004"), (b"GTG", b'V', b"004"), (b"GTT", b'V', b"004"),
    (b"TAA", b'*', b"022"), (b"TAC", b'Y', b"002"), (b"TAG", b'*', b"002"), (b"TAT", b'Y', b"002"),
    (b"TCA", b'S', b"004"), (b"TCC", b'S', b"004"), (b"TCG", b'S', b"004"), (b"TCT", b'S', b"004"),
    (b"TGA", b'*', b"020"), (b"TGC", b'C', b"002"), (b"TGG", b'W', b"000"), (b"TGT", b'C', b"002"),
    (b"TTA", b'L', b"202"), (b"TTC", b'F', b"002"), (b"TTG", b'L', b"202"), (b"TTT", b'F', b"002"),
];

/// One row of a codon table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodonEntry {
    pub codon: Codon,
    pub amino_acid: Residue,
    /// Degeneracy of the first, second and third codon position
    pub degeneracy: [u8; 3],
}

/// Codon to amino acid and degeneracy lookup, indexed by `seq::codon_index`.
#[derive(Debug, Clone)]
pub struct CodonTable {
    entries: Vec<CodonEntry>,
}

impl CodonTable {
    /// Standard genetic code (NCBI translation table 1).
    pub fn standard() -> CodonTable {
        let entries = STANDARD
            .iter()
            .map(|&(codon, aa, degen)| CodonEntry {
                codon: *codon,
                amino_acid: aa,
                degeneracy: [degen[0] - b'0', degen[1] - b'0', degen[2] - b'0'],
            })
            .collect();
        CodonTable { entries }
    }

    /// Read a substitute codon table.
    ///
    /// Rows are comma-separated `codon,degeneracy,amino_acid`, e.g. `AAA,002,K`.
    /// The table must list all 64 codons, and the degeneracy digits must agree
    /// with the amino acid assignment.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<CodonTable> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut slots: Vec<Option<CodonEntry>> = vec![None; N_CODONS];
        for r in rdr.records() {
            let record = r?;
            if record.len() < 3 {
                return Err(Error::CodonTable(format!("expected 3 columns, found {}", record.len())));
            }
            let codon = seq::to_codon(record[0].as_bytes())
                .ok_or_else(|| Error::CodonTable(format!("invalid codon {}", &record[0])))?;
            let idx = seq::codon_index(&codon)
                .ok_or_else(|| Error::CodonTable(format!("invalid codon {}", &record[0])))?;
            let degen = record[1].as_bytes();
            if degen.len() != 3 || !degen.iter().all(|d| matches!(d, b'0' | b'2' | b'3' | b'4')) {
                return Err(Error::CodonTable(format!("invalid degeneracy {} for {}", &record[1], &record[0])));
            }
            let aa = match record[2].as_bytes() {
                [aa] => aa.to_ascii_uppercase(),
                _ => return Err(Error::CodonTable(format!("invalid amino acid {} for {}", &record[2], &record[0]))),
            };
            if slots[idx].is_some() {
                return Err(Error::CodonTable(format!("duplicate codon {}", &record[0])));
            }
            slots[idx] = Some(CodonEntry {
                codon,
                amino_acid: aa,
                degeneracy: [degen[0] - b'0', degen[1] - b'0', degen[2] - b'0'],
            });
        }

        let n = slots.iter().filter(|x| x.is_some()).count();
        if n != N_CODONS {
            return Err(Error::CodonTable(format!("expected {} codons, found {}", N_CODONS, n)));
        }

        let table = CodonTable { entries: slots.into_iter().flatten().collect() };
        for entry in table.entries.iter() {
            for pos in 0..CODON_LEN {
                let expected = table.count_degeneracy(&entry.codon, pos);
                if entry.degeneracy[pos] != expected {
                    return Err(Error::CodonTable(format!(
                        "degeneracy of {} at position {} is {} but the amino acids imply {}",
                        seq::codon_str(&entry.codon), pos + 1, entry.degeneracy[pos], expected
                    )));
                }
            }
        }

        Ok(table)
    }

    #[inline]
    pub fn lookup(&self, codon: &[Nucleotide]) -> ::std::result::Result<&CodonEntry, UnknownCodon> {
        match seq::codon_index(codon) {
            Some(idx) => Ok(&self.entries[idx]),
            None => {
                let mut bad = [b'.'; 3];
                for (b, &x) in bad.iter_mut().zip(codon.iter()) {
                    *b = x;
                }
                Err(UnknownCodon(bad))
            }
        }
    }

    #[inline]
    pub fn amino_acid(&self, codon: &[Nucleotide]) -> Option<Residue> {
        self.lookup(codon).ok().map(|e| e.amino_acid)
    }

    pub fn entries(&self) -> impl Iterator<Item = &CodonEntry> {
        self.entries.iter()
    }

    /// Translate complete codons; codons with ambiguous bases become `X`.
    pub fn translate(&self, seq: &[Nucleotide]) -> Peptide {
        seq.chunks_exact(CODON_LEN)
            .map(|c| self.amino_acid(c).unwrap_or(UNKNOWN_RESIDUE))
            .collect()
    }

    /// Degeneracy implied by the amino acid assignment of neighbouring codons.
    fn count_degeneracy(&self, codon: &Codon, pos: usize) -> u8 {
        let aa = match self.amino_acid(codon) {
            Some(aa) => aa,
            None => return 0,
        };
        let mut alt = *codon;
        let n = NUCLEOTIDES
            .iter()
            .filter(|&&nt| {
                alt[pos] = nt;
                self.amino_acid(&alt) == Some(aa)
            })
            .count() as u8;
        if n == 1 { 0 } else { n }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let table = CodonTable::standard();
        let entry = table.lookup(b"ATG").unwrap();
        assert_eq!(entry.amino_acid, b'M');
        assert_eq!(entry.degeneracy, [0, 0, 0]);

        let entry = table.lookup(b"ctg").unwrap();
        assert_eq!(entry.codon, *b"CTG");
        assert_eq!(entry.amino_acid, b'L');
        assert_eq!(entry.degeneracy, [2, 0, 4]);

        assert_eq!(table.lookup(b"TAA").unwrap().amino_acid, b'*');
        assert_eq!(table.lookup(b"ATA").unwrap().degeneracy, [0, 0, 3]);
    }

    #[test]
    fn test_unknown_codon() {
        let table = CodonTable::standard();
        assert_eq!(table.lookup(b"ANG"), Err(UnknownCodon(*b"ANG")));
        assert!(table.lookup(b"NNN").is_err());
        assert_eq!(table.amino_acid(b"AT-"), None);
    }

    #[test]
    fn test_degeneracy_consistent_with_amino_acids() {
        let table = CodonTable::standard();
        assert_eq!(table.entries().count(), N_CODONS);
        for entry in table.entries() {
            for pos in 0..CODON_LEN {
                let same = NUCLEOTIDES
                    .iter()
                    .filter(|&&nt| {
                        let mut alt = entry.codon;
                        alt[pos] = nt;
                        table.amino_acid(&alt) == Some(entry.amino_acid)
                    })
                    .count() as u8;
                let expected = if same == 1 { 0 } else { same };
                assert_eq!(entry.degeneracy[pos], expected, "{:?} position {}", entry.codon, pos);
            }
        }
    }

    #[test]
    fn test_translate() {
        let table = CodonTable::standard();
        assert_eq!(table.translate(b"ATGGCATGCTAA"), b"MAC*".to_vec());
        assert_eq!(table.translate(b"ATGNNNTG"), b"MX".to_vec());
        assert!(table.translate(b"").is_empty());
    }

    fn standard_csv() -> String {
        CodonTable::standard()
            .entries()
            .map(|e| {
                format!(
                    "{},{}{}{},{}\n",
                    seq::codon_str(&e.codon),
                    e.degeneracy[0], e.degeneracy[1], e.degeneracy[2],
                    e.amino_acid as char
                )
            })
            .collect()
    }

    #[test]
    fn test_from_reader() {
        let text = standard_csv();
        let table = CodonTable::from_reader(text.as_bytes()).unwrap();
        let standard = CodonTable::standard();
        for (a, b) in table.entries().zip(standard.entries()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_from_reader_rejects_bad_tables() {
        let text = standard_csv();

        // missing codon
        let short: String = text.lines().skip(1).map(|l| format!("{}\n", l)).collect();
        assert!(CodonTable::from_reader(short.as_bytes()).is_err());

        // inconsistent degeneracy
        let wrong = text.replacen("AAA,002,K", "AAA,004,K", 1);
        match CodonTable::from_reader(wrong.as_bytes()) {
            Err(Error::CodonTable(msg)) => assert!(msg.contains("AAA")),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
