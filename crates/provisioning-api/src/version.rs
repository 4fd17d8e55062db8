// version.rs
//
// Ordenación de versiones de plugin que compara numéricamente los segmentos
// numéricos, de modo que "2.11" > "2.10" > "2.9".
use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Part<'a> {
  Num(u64),
  Text(&'a str),
}

fn parts(version: &str) -> Vec<Part<'_>> {
  version.split('.')
         .map(|p| p.parse::<u64>().map(Part::Num).unwrap_or(Part::Text(p)))
         .collect()
}

/// Compara dos versiones segmento a segmento. Un segmento numérico ordena antes
/// que uno textual.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
  parts(a).cmp(&parts(b))
}

/// Ordena de la versión más nueva a la más antigua.
pub fn sort_versions_desc(versions: &mut [String]) {
  versions.sort_by(|a, b| compare_versions(b, a));
}
