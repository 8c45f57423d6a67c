//! Labelled adjacency matrices stored as CSV.

use crate::error::IngestError;
use crate::graph::{GraphKind, Network, NetworkBuilder};
use std::io::Read;

/// Parse a square adjacency matrix.
///
/// The header row holds the node labels after one leading cell; every data
/// row starts with the label of its node, in the same order as the header.
/// A non-zero cell `(i, j)` becomes an edge `i -> j` weighted by the cell.
/// Undirected networks read the upper triangle including the diagonal.
pub fn parse_adjacency_csv<R: Read>(
    id: &str,
    reader: R,
    kind: GraphKind,
) -> Result<Network, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let labels: Vec<String> = csv_reader
        .headers()?
        .iter()
        .skip(1)
        .map(str::to_string)
        .collect();

    let mut builder = NetworkBuilder::new(id, kind);
    for label in &labels {
        builder.add_node(label.as_str())?;
    }

    let mut rows = 0;
    for (i, record) in csv_reader.records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(i + 2);

        let row_label = record.get(0).unwrap_or_default();
        match labels.get(i) {
            Some(expected) if expected == row_label => {}
            Some(expected) => {
                return Err(IngestError::malformed(
                    line,
                    format!("row label '{}' does not match column '{}'", row_label, expected),
                ))
            }
            None => {
                return Err(IngestError::malformed(
                    line,
                    format!("extra row '{}' beyond {} columns", row_label, labels.len()),
                ))
            }
        }

        for (j, cell) in record.iter().skip(1).enumerate() {
            if !kind.is_directed() && j < i {
                continue;
            }
            let weight: f64 = cell.parse().map_err(|_| {
                IngestError::malformed(line, format!("non-numeric cell '{}'", cell))
            })?;
            if weight != 0.0 {
                builder
                    .add_edge(&labels[i], &labels[j], Some(weight))
                    .map_err(|e| IngestError::malformed(line, e.to_string()))?;
            }
        }
        rows += 1;
    }

    if rows != labels.len() {
        return Err(IngestError::malformed(
            rows + 1,
            format!("matrix has {} rows for {} columns", rows, labels.len()),
        ));
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const MATRIX: &str = ",A,B,C\nA,0,1,0\nB,1,0,2.5\nC,0,2.5,0\n";

    #[test]
    fn test_undirected_upper_triangle() {
        let net = parse_adjacency_csv("m", Cursor::new(MATRIX), GraphKind::Undirected).unwrap();

        assert_eq!(net.node_count(), 3);
        assert_eq!(net.edge_count(), 2);
        let weights: Vec<f64> = net.edges().map(|(_, _, w)| w).collect();
        assert_eq!(weights, vec![1.0, 2.5]);
    }

    #[test]
    fn test_directed_reads_every_cell() {
        let net = parse_adjacency_csv("m", Cursor::new(MATRIX), GraphKind::Directed).unwrap();
        assert_eq!(net.edge_count(), 4);
    }

    #[test]
    fn test_isolated_nodes_kept() {
        let data = ",A,B\nA,0,0\nB,0,0\n";
        let net = parse_adjacency_csv("empty", Cursor::new(data), GraphKind::Undirected).unwrap();
        assert_eq!(net.node_count(), 2);
        assert_eq!(net.edge_count(), 0);
    }

    #[test]
    fn test_bad_cell() {
        let data = ",A,B\nA,0,x\nB,x,0\n";
        let err = parse_adjacency_csv("bad", Cursor::new(data), GraphKind::Undirected).unwrap_err();
        assert!(matches!(err, IngestError::MalformedRow { line: 2, .. }));
    }

    #[test]
    fn test_label_mismatch() {
        let data = ",A,B\nB,0,1\nA,1,0\n";
        let err = parse_adjacency_csv("bad", Cursor::new(data), GraphKind::Undirected).unwrap_err();
        assert!(matches!(err, IngestError::MalformedRow { .. }));
    }

    #[test]
    fn test_duplicate_label() {
        let data = ",A,A\nA,0,1\nA,1,0\n";
        let err = parse_adjacency_csv("dup", Cursor::new(data), GraphKind::Undirected).unwrap_err();
        assert!(matches!(err, IngestError::Graph(_)));
    }
}
