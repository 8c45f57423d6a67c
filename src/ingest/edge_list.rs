//! Whitespace separated edge lists.

use crate::error::IngestError;
use crate::graph::{GraphKind, Network, NetworkBuilder};
use std::io::BufRead;

/// Parse `from to [weight]` rows.
///
/// Blank lines and lines starting with `#` are skipped. The first data row
/// fixes the column count (2 = unweighted, 3 = weighted); every other row
/// must match it.
pub fn parse_edge_list<R: BufRead>(
    id: &str,
    reader: R,
    kind: GraphKind,
) -> Result<Network, IngestError> {
    let mut builder = NetworkBuilder::new(id, kind);
    let mut columns: Option<usize> = None;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        let expected = *columns.get_or_insert(parts.len());

        if parts.len() != 2 && parts.len() != 3 {
            return Err(IngestError::malformed(
                line_no,
                format!("expected 2 or 3 columns, found {}", parts.len()),
            ));
        }
        if parts.len() != expected {
            return Err(IngestError::malformed(
                line_no,
                format!("expected {} columns like the first row, found {}", expected, parts.len()),
            ));
        }

        let weight = match parts.get(2) {
            Some(raw) => Some(raw.parse::<f64>().map_err(|_| {
                IngestError::malformed(line_no, format!("non-numeric weight '{}'", raw))
            })?),
            None => None,
        };

        builder
            .add_weighted_edge_auto(parts[0], parts[1], weight)
            .map_err(|e| IngestError::malformed(line_no, e.to_string()))?;
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_unweighted_rows() {
        let data = "# comment\n1 2\n2 3\n\n3 1\n";
        let net = parse_edge_list("tri", Cursor::new(data), GraphKind::Undirected).unwrap();

        assert_eq!(net.node_count(), 3);
        assert_eq!(net.edge_count(), 3);
        assert!(net.edges().all(|(_, _, w)| w == 1.0));
    }

    #[test]
    fn test_weighted_rows() {
        let data = "a b 0.25\nb c 4\n";
        let net = parse_edge_list("w", Cursor::new(data), GraphKind::Directed).unwrap();

        let weights: Vec<f64> = net.edges().map(|(_, _, w)| w).collect();
        assert_eq!(weights, vec![0.25, 4.0]);
        assert!(net.is_directed());
    }

    #[test]
    fn test_non_numeric_weight() {
        let data = "a b 1\nb c heavy\n";
        let err = parse_edge_list("bad", Cursor::new(data), GraphKind::Undirected).unwrap_err();

        match err {
            IngestError::MalformedRow { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("heavy"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_endpoint() {
        let err = parse_edge_list("bad", Cursor::new("a b\nc\n"), GraphKind::Undirected)
            .unwrap_err();
        assert!(matches!(err, IngestError::MalformedRow { line: 2, .. }));
    }

    #[test]
    fn test_negative_weight() {
        let err = parse_edge_list("bad", Cursor::new("a b -2\n"), GraphKind::Undirected)
            .unwrap_err();
        assert!(matches!(err, IngestError::MalformedRow { line: 1, .. }));
    }
}
