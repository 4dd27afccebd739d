use std::collections::HashMap;
use std::io;
use std::path::Path;

use crate::constants::*;
use crate::error::{Error, Result};
use crate::gene::Pos;
use crate::mutation::{CodonVariants, VariantLookup};
use crate::seq::{self, Codon, CoordinateMap, Nucleotide};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Group {
    Ingroup,
    Outgroup,
}

impl Group {
    fn parse(x: &str) -> Option<Group> {
        match x.to_lowercase().as_str() {
            "ingroup" | "in" => Some(Group::Ingroup),
            "outgroup" | "out" => Some(Group::Outgroup),
            _ => None,
        }
    }
}

/// A SNV record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// Contig name, or transcript ID for coding sequence input
    pub region: String,
    /// 1-based position
    pub pos: Pos,
    /// Reference nucleotide on the forward strand
    pub ref_nt: Nucleotide,
    /// Observed alternate nucleotide on the forward strand
    pub alt_nt: Nucleotide,
    pub group: Group,
}

/// A SNV reader.
///
/// Tab-separated with a header line and columns `region pos ref alt group`.
/// Positions are 1-based. `group` is `ingroup` (or `in`) for polymorphisms and
/// `outgroup` (or `out`) for fixed differences.
pub struct Reader<R: io::Read> {
    inner: csv::Reader<R>,
}

impl<R: io::Read> Reader<R> {
    pub fn new(reader: R) -> Self {
        Reader {
            inner: csv::ReaderBuilder::new()
                .delimiter(b'\t')
                .comment(Some(b'#'))
                .has_headers(true)
                .trim(csv::Trim::All)
                .from_reader(reader),
        }
    }

    /// Iterate over records.
    /// Stop reading as soon as a problematic record is encountered.
    pub fn records(&mut self) -> Records<R> {
        Records { inner: self.inner.records() }
    }
}

pub struct Records<'r, R: 'r + io::Read> {
    inner: csv::StringRecordsIter<'r, R>,
}

fn field<'a>(record: &'a csv::StringRecord, i: usize, name: &str) -> Result<&'a str> {
    record
        .get(i)
        .ok_or_else(|| Error::Variants(format!("missing field {} in {:?}", name, record)))
}

fn nucleotide(x: &str, name: &str) -> Result<Nucleotide> {
    match x.as_bytes() {
        [nt] => Ok(nt.to_ascii_uppercase()),
        _ => Err(Error::Variants(format!("{} must be a single nucleotide, found {}", name, x))),
    }
}

fn parse_record(record: &csv::StringRecord) -> Result<Record> {
    let pos_str = field(record, 1, "pos")?;
    let pos = pos_str
        .parse::<Pos>()
        .ok()
        .filter(|&p| p > 0)
        .ok_or_else(|| Error::Variants(format!("invalid position {}", pos_str)))?;
    let group_str = field(record, 4, "group")?;

    Ok(Record {
        region: field(record, 0, "region")?.to_owned(),
        pos,
        ref_nt: nucleotide(field(record, 2, "ref")?, "ref")?,
        alt_nt: nucleotide(field(record, 3, "alt")?, "alt")?,
        group: Group::parse(group_str)
            .ok_or_else(|| Error::Variants(format!("unknown group {}", group_str)))?,
    })
}

impl<'r, R: io::Read> Iterator for Records<'r, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Result<Record>> {
        self.inner.next().map(|res| match res {
            Err(err) => Err(Error::from(err)),
            Ok(record) => parse_record(&record),
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Allele {
    ref_nt: Nucleotide,
    alt_nt: Nucleotide,
    group: Group,
}

/// Variants indexed by region and 1-based position.
#[derive(Debug, Default)]
pub struct VariantTable {
    regions: HashMap<String, HashMap<Pos, Vec<Allele>>>,
    n: usize,
}

impl VariantTable {
    pub fn from_reader<R: io::Read>(reader: R) -> Result<VariantTable> {
        let mut table = VariantTable::default();
        for r in Reader::new(reader).records() {
            table.insert(r?);
        }
        Ok(table)
    }

    /// Read a variant table file, plain or gzip-compressed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<VariantTable> {
        VariantTable::from_reader(super::open(path)?)
    }

    pub fn insert(&mut self, record: Record) {
        let allele = Allele {
            ref_nt: record.ref_nt,
            alt_nt: record.alt_nt,
            group: record.group,
        };
        self.regions
            .entry(record.region)
            .or_insert_with(HashMap::new)
            .entry(record.pos)
            .or_insert_with(Vec::new)
            .push(allele);
        self.n += 1;
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Variants of a transcript whose coding sequence is spliced from `region`.
    pub fn on_genome<'a>(&'a self, region: &str, map: &'a CoordinateMap, reverse: bool) -> GenomeVariants<'a> {
        GenomeVariants {
            sites: self.regions.get(region),
            map,
            reverse,
        }
    }
}

/// Collect the variant codons of `reference` from the alleles at each of its positions.
fn collect<'a, F>(transcript_id: &str, cds_offset: usize, reference: &Codon, reverse: bool, alleles_at: F) -> CodonVariants
where
    F: Fn(usize) -> Option<&'a Vec<Allele>>,
{
    let mut variants = CodonVariants::default();
    let mut divergent = *reference;
    let mut diverged = false;

    for i in 0..CODON_LEN {
        let alleles = match alleles_at(cds_offset + i) {
            Some(alleles) => alleles,
            None => continue,
        };
        for allele in alleles.iter() {
            let (ref_nt, alt_nt) = if reverse {
                (seq::complement(allele.ref_nt), seq::complement(allele.alt_nt))
            } else {
                (allele.ref_nt, allele.alt_nt)
            };
            if ref_nt != reference[i] {
                log::debug!(
                    "{}:{} variant reference {} does not match {}; ignoring",
                    transcript_id, cds_offset + i, ref_nt as char, reference[i] as char
                );
                continue;
            }
            match allele.group {
                Group::Ingroup => {
                    let mut alt = *reference;
                    alt[i] = alt_nt;
                    variants.polymorphic.push(alt);
                },
                Group::Outgroup => {
                    divergent[i] = alt_nt;
                    diverged = true;
                },
            }
        }
    }

    if diverged {
        variants.divergent = Some(divergent);
    }
    variants
}

/// For coding sequence input: the region is the transcript ID and positions
/// are positions along the coding sequence.
impl VariantLookup for VariantTable {
    fn variants(&self, transcript_id: &str, cds_offset: usize, reference: &Codon) -> CodonVariants {
        match self.regions.get(transcript_id) {
            Some(sites) => collect(transcript_id, cds_offset, reference, false, |x| sites.get(&(x as Pos + 1))),
            None => CodonVariants::default(),
        }
    }
}

/// Variants of one transcript, projected from genome coordinates.
pub struct GenomeVariants<'a> {
    sites: Option<&'a HashMap<Pos, Vec<Allele>>>,
    map: &'a CoordinateMap,
    reverse: bool,
}

impl<'a> VariantLookup for GenomeVariants<'a> {
    fn variants(&self, transcript_id: &str, cds_offset: usize, reference: &Codon) -> CodonVariants {
        let sites = match self.sites {
            Some(sites) => sites,
            None => return CodonVariants::default(),
        };
        let map = self.map;
        collect(transcript_id, cds_offset, reference, self.reverse, |x| {
            map.genome_pos(x).and_then(|g| sites.get(&g))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNV_FILE: &[u8] = b"region\tpos\tref\talt\tgroup
# comment
chr1\t2\tC\tT\tingroup
chr1\t3\tG\tA\tout
chr1\t4\tT\tC\tOUTGROUP
chr1\t5\tG\tC\tin
t1\t3\tG\tT\tin
";

    #[test]
    fn test_reader() {
        let mut reader = Reader::new(SNV_FILE);
        let records: Vec<Record> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 5);
        assert_eq!(
            records[0],
            Record { region: "chr1".to_owned(), pos: 2, ref_nt: b'C', alt_nt: b'T', group: Group::Ingroup }
        );
        assert_eq!(records[1].group, Group::Outgroup);
        assert_eq!(records[2].group, Group::Outgroup);
        assert_eq!(records[4].region, "t1");
    }

    #[test]
    fn test_reader_errors() {
        let bad_group = b"region\tpos\tref\talt\tgroup\nchr1\t2\tC\tT\tsister\n";
        let err = VariantTable::from_reader(&bad_group[..]).unwrap_err();
        assert_eq!(err.code(), "SNV1");

        let bad_pos = b"region\tpos\tref\talt\tgroup\nchr1\t0\tC\tT\tin\n";
        assert_eq!(VariantTable::from_reader(&bad_pos[..]).unwrap_err().code(), "SNV1");

        let bad_allele = b"region\tpos\tref\talt\tgroup\nchr1\t2\tCA\tT\tin\n";
        assert_eq!(VariantTable::from_reader(&bad_allele[..]).unwrap_err().code(), "SNV1");
    }

    #[test]
    fn test_cds_lookup() {
        let table = VariantTable::from_reader(SNV_FILE).unwrap();
        assert_eq!(table.len(), 5);
        // t1 position 3 is the third base of the first codon
        let v = table.variants("t1", 0, b"ATG");
        assert_eq!(v.polymorphic, vec![*b"ATT"]);
        assert_eq!(v.divergent, None);
        assert!(table.variants("t1", 3, b"AAA").is_empty());
        assert!(table.variants("t2", 0, b"ATG").is_empty());
    }

    #[test]
    fn test_genome_lookup_forward() {
        let table = VariantTable::from_reader(SNV_FILE).unwrap();
        let mut map = CoordinateMap::default();
        for g in 2..8 {
            map.push(g);
        }
        let lookup = table.on_genome("chr1", &map, false);

        // genome 2..4 = CGT
        let v = lookup.variants("tx", 0, b"CGT");
        assert_eq!(v.polymorphic, vec![*b"TGT"]);
        assert_eq!(v.divergent, Some(*b"CAC"));

        // genome 5 = G; reference mismatch at 5 is ignored
        let v = lookup.variants("tx", 3, b"ACG");
        assert!(v.is_empty());
        let v = lookup.variants("tx", 3, b"GCG");
        assert_eq!(v.polymorphic, vec![*b"CCG"]);

        assert!(table.on_genome("chr9", &map, false).variants("tx", 0, b"CGT").is_empty());
    }

    #[test]
    fn test_genome_lookup_reverse() {
        let table = VariantTable::from_reader(SNV_FILE).unwrap();
        let mut map = CoordinateMap::default();
        for g in (2..5).rev() {
            map.push(g);
        }
        let lookup = table.on_genome("chr1", &map, true);

        // genome 4,3,2 = T,G,C complemented: A,C,G
        let v = lookup.variants("tx", 0, b"ACG");
        assert_eq!(v.polymorphic, vec![*b"ACA"]);
        assert_eq!(v.divergent, Some(*b"GTG"));
    }
}
