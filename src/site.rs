use crate::gene::Pos;
use crate::mutation::degeneracy::{self, Degeneracy, Site};
use crate::seq::{CodonTable, CoordinateMap};

/// Where the rows of a transcript are placed.
#[derive(Clone, Copy, Debug)]
pub enum SiteLocator<'a> {
    /// Genome coordinates of the transcript's region
    Genome { region: &'a str, map: &'a CoordinateMap },
    /// Coordinates along the coding sequence itself
    Cds,
}

/// One row of the per-site output. Intervals are 0-based, half-open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteRow {
    pub region: String,
    pub start: Pos,
    pub end: Pos,
    pub site_id: String,
    pub degeneracy: String,
    pub base: char,
    pub amino_acid: char,
    pub substitutions: String,
}

impl SiteRow {
    pub fn fields(&self) -> [String; 8] {
        [
            self.region.clone(),
            self.start.to_string(),
            self.end.to_string(),
            self.site_id.clone(),
            self.degeneracy.clone(),
            self.base.to_string(),
            self.amino_acid.to_string(),
            self.substitutions.clone(),
        ]
    }
}

/// Build the output row of `site`.
///
/// Sites without a mapped genome position are placed by their CDS offset.
pub fn emit(site: &Site, transcript_id: &str, locator: SiteLocator, table: &CodonTable) -> SiteRow {
    let offset = site.cds_offset as Pos;
    let (region, start, end) = match locator {
        SiteLocator::Genome { region, map } => match map.genome_pos(site.cds_offset) {
            Some(g) => (region.to_owned(), g - 1, g),
            None => (region.to_owned(), offset, offset + 1),
        },
        SiteLocator::Cds => (transcript_id.to_owned(), offset, offset + 1),
    };

    SiteRow {
        region,
        start,
        end,
        site_id: format!("{}:{}", transcript_id, site.cds_offset),
        degeneracy: site.degeneracy.to_string(),
        base: site.base as char,
        amino_acid: site.amino_acid.map(|aa| aa as char).unwrap_or('.'),
        substitutions: substitution_list(site, table),
    }
}

/// Non-synonymous substitutions at a site as `base:aa;base:aa`.
fn substitution_list(site: &Site, table: &CodonTable) -> String {
    match (site.degeneracy, site.codon, site.codon_pos) {
        (Degeneracy::Fold(4), _, _) | (Degeneracy::Unknown, _, _) => String::new(),
        (_, Some(codon), Some(pos)) => {
            let changes: Vec<String> = degeneracy::amino_acid_changes(table, &codon, pos)
                .into_iter()
                .map(|(nt, aa)| format!("{}:{}", nt as char, aa as char))
                .collect();
            changes.join(";")
        },
        _ => String::new(),
    }
}

/// All rows of a transcript; rows on the reverse strand are put in ascending
/// genome order.
pub fn emit_all(sites: &[Site], transcript_id: &str, locator: SiteLocator, reverse: bool, table: &CodonTable) -> Vec<SiteRow> {
    let mut rows: Vec<SiteRow> = sites
        .iter()
        .map(|site| emit(site, transcript_id, locator, table))
        .collect();
    if reverse {
        if let SiteLocator::Genome { .. } = locator {
            rows.reverse();
        }
    }
    rows
}
