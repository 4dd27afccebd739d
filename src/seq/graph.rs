use std::collections::VecDeque;

use crate::constants::*;
use crate::mutation::SubstitutionClass;
use crate::seq::{self, Codon, CodonTable};

/// Graph over all 64 codons with an edge between codons one substitution apart.
///
/// All shortest paths between every pair of codons are computed up front; the
/// graph is immutable afterwards and can be shared freely between threads.
pub struct CodonGraph {
    /// For each codon index, the indices of its single-substitution neighbours
    neighbors: Vec<Vec<usize>>,
    /// Shortest paths from a to b, stored at a * N_CODONS + b
    paths: Vec<Vec<Vec<usize>>>,
}

impl CodonGraph {
    pub fn new() -> CodonGraph {
        let mut neighbors = vec![Vec::new(); N_CODONS];
        for i in 0..N_CODONS {
            let a = seq::index_codon(i);
            for j in 0..N_CODONS {
                if seq::hamming(&a, &seq::index_codon(j)) == 1 {
                    neighbors[i].push(j);
                }
            }
        }

        let mut paths = Vec::with_capacity(N_CODONS * N_CODONS);
        for source in 0..N_CODONS {
            let preds = shortest_predecessors(&neighbors, source);
            for target in 0..N_CODONS {
                paths.push(enumerate_paths(&preds, source, target));
            }
        }

        CodonGraph { neighbors, paths }
    }

    /// Codons one substitution away from `codon`.
    pub fn neighbors(&self, codon: &Codon) -> Vec<Codon> {
        match seq::codon_index(codon) {
            Some(i) => self.neighbors[i].iter().map(|&j| seq::index_codon(j)).collect(),
            None => Vec::new(),
        }
    }

    /// Number of substitutions on a shortest path, or `None` for unknown codons.
    pub fn distance(&self, a: &Codon, b: &Codon) -> Option<usize> {
        self.paths_between(a, b)
            .and_then(|paths| paths.first())
            .map(|path| path.len() - 1)
    }

    /// All minimum-length paths from `a` to `b`, each including both end points.
    ///
    /// Yields nothing when either codon contains an ambiguous base.
    pub fn shortest_paths<'a>(&'a self, a: &Codon, b: &Codon) -> impl Iterator<Item = Vec<Codon>> + 'a {
        self.paths_between(a, b)
            .into_iter()
            .flat_map(|paths| paths.iter())
            .map(|path| path.iter().map(|&i| seq::index_codon(i)).collect())
    }

    /// Average number of synonymous and non-synonymous steps over all shortest
    /// paths from `a` to `b`, returned as `(ds, dn)`.
    pub fn path_average(&self, table: &CodonTable, a: &Codon, b: &Codon) -> Option<(f64, f64)> {
        let paths = self.paths_between(a, b)?;
        let mut ds = 0.0;
        let mut dn = 0.0;
        for path in paths.iter() {
            for step in path.windows(2) {
                let from = seq::index_codon(step[0]);
                let to = seq::index_codon(step[1]);
                match SubstitutionClass::between(table, &from, &to) {
                    Some(SubstitutionClass::Synonymous) => ds += 1.0,
                    Some(SubstitutionClass::Nonsynonymous) => dn += 1.0,
                    None => {}
                }
            }
        }
        let n = paths.len() as f64;
        Some((ds / n, dn / n))
    }

    fn paths_between(&self, a: &Codon, b: &Codon) -> Option<&Vec<Vec<usize>>> {
        let i = seq::codon_index(a)?;
        let j = seq::codon_index(b)?;
        Some(&self.paths[i * N_CODONS + j])
    }
}

impl Default for CodonGraph {
    fn default() -> Self {
        CodonGraph::new()
    }
}

/// Breadth-first search recording every predecessor at minimum distance.
fn shortest_predecessors(neighbors: &[Vec<usize>], source: usize) -> Vec<Vec<usize>> {
    let mut dist: Vec<Option<usize>> = vec![None; neighbors.len()];
    let mut preds = vec![Vec::new(); neighbors.len()];
    let mut queue = VecDeque::new();

    dist[source] = Some(0);
    queue.push_back(source);
    while let Some(u) = queue.pop_front() {
        let du = dist[u].unwrap_or(0);
        for &v in neighbors[u].iter() {
            match dist[v] {
                None => {
                    dist[v] = Some(du + 1);
                    preds[v].push(u);
                    queue.push_back(v);
                },
                Some(dv) if dv == du + 1 => preds[v].push(u),
                Some(_) => {},
            }
        }
    }

    preds
}

/// Walk predecessor lists back from `target` to `source`.
fn enumerate_paths(preds: &[Vec<usize>], source: usize, target: usize) -> Vec<Vec<usize>> {
    if target == source {
        return vec![vec![source]];
    }
    let mut paths = Vec::new();
    for &p in preds[target].iter() {
        for mut path in enumerate_paths(preds, source, p) {
            path.push(target);
            paths.push(path);
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1.0e-9;

    #[test]
    fn test_graph_structure() {
        let graph = CodonGraph::new();
        for i in 0..N_CODONS {
            let codon = seq::index_codon(i);
            let neighbors = graph.neighbors(&codon);
            assert_eq!(neighbors.len(), 9);
            for n in neighbors.iter() {
                assert_eq!(seq::hamming(&codon, n), 1);
                // edges are undirected
                assert!(graph.neighbors(n).contains(&codon));
            }
        }
        assert!(graph.neighbors(b"NAA").is_empty());
    }

    #[test]
    fn test_trivial_path() {
        let graph = CodonGraph::new();
        let paths: Vec<Vec<Codon>> = graph.shortest_paths(b"ACG", b"ACG").collect();
        assert_eq!(paths, vec![vec![*b"ACG"]]);
        assert_eq!(graph.distance(b"ACG", b"ACG"), Some(0));
    }

    #[test]
    fn test_path_lengths_match_hamming_distance() {
        let graph = CodonGraph::new();
        let factorial = [1, 1, 2, 6];
        for i in 0..N_CODONS {
            for j in 0..N_CODONS {
                let a = seq::index_codon(i);
                let b = seq::index_codon(j);
                let d = seq::hamming(&a, &b);
                let paths: Vec<Vec<Codon>> = graph.shortest_paths(&a, &b).collect();
                // one path per ordering of the differing positions
                assert_eq!(paths.len(), factorial[d]);
                for path in paths.iter() {
                    assert_eq!(path.len(), d + 1);
                    assert_eq!(path[0], a);
                    assert_eq!(path[d], b);
                    for step in path.windows(2) {
                        assert_eq!(seq::hamming(&step[0], &step[1]), 1);
                    }
                }
            }
        }
    }

    #[test]
    fn test_unknown_codons() {
        let graph = CodonGraph::new();
        assert_eq!(graph.shortest_paths(b"ANA", b"AAA").count(), 0);
        assert_eq!(graph.distance(b"AAA", b"AAN"), None);
        assert_eq!(graph.path_average(&CodonTable::standard(), b"AAA", b"NNN"), None);
    }

    #[test]
    fn test_path_average_two_steps() {
        let graph = CodonGraph::new();
        let table = CodonTable::standard();
        // CTT (L) -> TTA (L)
        //   via TTT (F): L>F non, F>L non
        //   via CTA (L): L>L syn, L>L syn
        let (ds, dn) = graph.path_average(&table, b"CTT", b"TTA").unwrap();
        assert!((ds - 1.0).abs() < EPS);
        assert!((dn - 1.0).abs() < EPS);
    }

    #[test]
    fn test_path_average_three_steps_is_deterministic() {
        let graph = CodonGraph::new();
        let table = CodonTable::standard();
        let (ds, dn) = graph.path_average(&table, b"AAA", b"TTT").unwrap();
        assert!((ds + dn - 3.0).abs() < EPS);

        // recompute by brute force over the six orderings of the three positions
        let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        let mut syn = 0.0;
        for order in orders.iter() {
            let mut cur = *b"AAA";
            for &pos in order.iter() {
                let before = table.amino_acid(&cur);
                cur[pos] = b'T';
                if table.amino_acid(&cur) == before {
                    syn += 1.0;
                }
            }
        }
        assert!((ds - syn / 6.0).abs() < EPS);

        let again = CodonGraph::new().path_average(&table, b"AAA", b"TTT").unwrap();
        assert_eq!((ds, dn), again);
    }
}
