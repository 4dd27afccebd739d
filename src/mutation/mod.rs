pub mod degeneracy;
pub mod substitution;

use crate::seq::{Codon, CodonTable};

pub use self::degeneracy::{Classification, Degeneracy, DegeneracyTally, Site};
pub use self::substitution::{CodonVariants, SubstitutionCount, VariantLookup};

/// Effect of a codon change on the encoded amino acid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SubstitutionClass {
    Synonymous,
    Nonsynonymous,
}

impl SubstitutionClass {
    /// Classify the change from `from` to `to`.
    /// Returns `None` if either codon cannot be translated.
    pub fn between(table: &CodonTable, from: &Codon, to: &Codon) -> Option<SubstitutionClass> {
        let aa_from = table.amino_acid(from)?;
        let aa_to = table.amino_acid(to)?;
        if aa_from == aa_to {
            Some(SubstitutionClass::Synonymous)
        } else {
            Some(SubstitutionClass::Nonsynonymous)
        }
    }
}
