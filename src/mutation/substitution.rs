use std::ops;

use crate::mutation::SubstitutionClass;
use crate::seq::{Codon, CodonGraph, CodonTable};

/// Polymorphism and divergence counts for the McDonald-Kreitman test.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SubstitutionCount {
    /// Non-synonymous polymorphisms
    pub pn: f64,
    /// Synonymous polymorphisms
    pub ps: f64,
    /// Non-synonymous fixed differences
    pub dn: f64,
    /// Synonymous fixed differences
    pub ds: f64,
}

impl SubstitutionCount {
    pub fn is_empty(&self) -> bool {
        self.pn == 0.0 && self.ps == 0.0 && self.dn == 0.0 && self.ds == 0.0
    }
}

impl ops::AddAssign for SubstitutionCount {
    fn add_assign(&mut self, other: SubstitutionCount) {
        self.pn += other.pn;
        self.ps += other.ps;
        self.dn += other.dn;
        self.ds += other.ds;
    }
}

/// Variant codons observed at one reference codon.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodonVariants {
    /// One codon per ingroup allele
    pub polymorphic: Vec<Codon>,
    /// Reference codon with every outgroup allele applied
    pub divergent: Option<Codon>,
}

impl CodonVariants {
    pub fn is_empty(&self) -> bool {
        self.polymorphic.is_empty() && self.divergent.is_none()
    }
}

/// Source of observed variants for a transcript.
pub trait VariantLookup {
    /// Variants at the codon starting at `cds_offset` (0-based) of `transcript_id`.
    fn variants(&self, transcript_id: &str, cds_offset: usize, reference: &Codon) -> CodonVariants;
}

/// A lookup without any variants.
impl VariantLookup for () {
    fn variants(&self, _: &str, _: usize, _: &Codon) -> CodonVariants {
        CodonVariants::default()
    }
}

/// Count synonymous and non-synonymous changes from `reference` to its variants.
///
/// Each polymorphic codon counts as one polymorphism. A divergent codon that
/// differs at a single position counts as one fixed difference; one that
/// differs at more positions contributes the synonymous and non-synonymous
/// steps averaged over all shortest mutational paths. Codons with ambiguous
/// bases are skipped.
pub fn classify(reference: &Codon, variants: &CodonVariants, table: &CodonTable, graph: &CodonGraph) -> SubstitutionCount {
    let mut count = SubstitutionCount::default();

    for alt in variants.polymorphic.iter() {
        match SubstitutionClass::between(table, reference, alt) {
            Some(SubstitutionClass::Synonymous) => count.ps += 1.0,
            Some(SubstitutionClass::Nonsynonymous) => count.pn += 1.0,
            None => {},
        }
    }

    if let Some(ref alt) = variants.divergent {
        match graph.distance(reference, alt) {
            None | Some(0) => {},
            Some(1) => match SubstitutionClass::between(table, reference, alt) {
                Some(SubstitutionClass::Synonymous) => count.ds += 1.0,
                Some(SubstitutionClass::Nonsynonymous) => count.dn += 1.0,
                None => {},
            },
            Some(_) => {
                if let Some((ds, dn)) = graph.path_average(table, reference, alt) {
                    count.ds += ds;
                    count.dn += dn;
                }
            },
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1.0e-9;

    struct Fixed(CodonVariants);

    impl VariantLookup for Fixed {
        fn variants(&self, _: &str, cds_offset: usize, _: &Codon) -> CodonVariants {
            if cds_offset == 3 {
                self.0.clone()
            } else {
                CodonVariants::default()
            }
        }
    }

    #[test]
    fn test_polymorphisms() {
        let table = CodonTable::standard();
        let graph = CodonGraph::new();
        let variants = CodonVariants {
            // CTT (L): CTA (L), TTT (F), CTG (L)
            polymorphic: vec![*b"CTA", *b"TTT", *b"CTG"],
            divergent: None,
        };
        let count = classify(b"CTT", &variants, &table, &graph);
        assert_eq!(count, SubstitutionCount { pn: 1.0, ps: 2.0, dn: 0.0, ds: 0.0 });
    }

    #[test]
    fn test_single_divergence() {
        let table = CodonTable::standard();
        let graph = CodonGraph::new();
        let syn = CodonVariants { polymorphic: vec![], divergent: Some(*b"GGA") };
        assert_eq!(classify(b"GGG", &syn, &table, &graph).ds, 1.0);
        let non = CodonVariants { polymorphic: vec![], divergent: Some(*b"AGG") };
        assert_eq!(classify(b"GGG", &non, &table, &graph).dn, 1.0);
        let same = CodonVariants { polymorphic: vec![], divergent: Some(*b"GGG") };
        assert!(classify(b"GGG", &same, &table, &graph).is_empty());
    }

    #[test]
    fn test_multiple_divergence_uses_paths() {
        let table = CodonTable::standard();
        let graph = CodonGraph::new();
        let variants = CodonVariants { polymorphic: vec![], divergent: Some(*b"TTT") };
        let count = classify(b"AAA", &variants, &table, &graph);
        let (ds, dn) = graph.path_average(&table, b"AAA", b"TTT").unwrap();
        assert!((count.ds - ds).abs() < EPS);
        assert!((count.dn - dn).abs() < EPS);
        assert!((count.ds + count.dn - 3.0).abs() < EPS);
        assert_eq!(count.pn + count.ps, 0.0);

        let variants = CodonVariants { polymorphic: vec![], divergent: Some(*b"TTA") };
        let count = classify(b"CTT", &variants, &table, &graph);
        assert!((count.ds - 1.0).abs() < EPS);
        assert!((count.dn - 1.0).abs() < EPS);
    }

    #[test]
    fn test_ambiguous_codons_are_skipped() {
        let table = CodonTable::standard();
        let graph = CodonGraph::new();
        let variants = CodonVariants { polymorphic: vec![*b"CTN"], divergent: Some(*b"NNA") };
        assert!(classify(b"CTT", &variants, &table, &graph).is_empty());
        let variants = CodonVariants { polymorphic: vec![*b"CTA"], divergent: Some(*b"CTA") };
        assert!(classify(b"CNT", &variants, &table, &graph).is_empty());
    }

    #[test]
    fn test_lookup_by_offset() {
        let table = CodonTable::standard();
        let graph = CodonGraph::new();
        let lookup = Fixed(CodonVariants { polymorphic: vec![*b"AAG"], divergent: Some(*b"AAC") });

        let mut total = SubstitutionCount::default();
        for &(offset, ref codon) in [(0, *b"ATG"), (3, *b"AAA"), (6, *b"TAA")].iter() {
            total += classify(codon, &lookup.variants("t1", offset, codon), &table, &graph);
        }
        assert_eq!(total, SubstitutionCount { pn: 0.0, ps: 1.0, dn: 1.0, ds: 0.0 });
        assert!(().variants("t1", 3, b"AAA").is_empty());
    }
}
