//! Plain-text table rendering.

/// Renders rows as a left-justified table with columns auto-sized to their
/// widest cell and a dash separator under the header.
pub fn render(columns: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(
        columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" "),
    );
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join(" "),
    );
    for row in rows {
        lines.push(
            row.iter()
                .enumerate()
                .take(widths.len())
                .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
                .collect::<Vec<_>>()
                .join(" "),
        );
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_size_to_widest_cell() {
        let out = render(
            &["asset", "max"],
            &[
                vec!["srv-1".to_string(), "188".to_string()],
                vec!["a-very-long-asset-id".to_string(), "5".to_string()],
            ],
        );

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("asset"));
        assert!(lines[1].starts_with("--------------------")); // width of longest id
        assert!(lines[2].starts_with("srv-1 "));
        assert!(lines[3].starts_with("a-very-long-asset-id"));
    }

    #[test]
    fn test_header_only_when_no_rows() {
        let out = render(&["a", "b"], &[]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["a b", "- -"]);
    }

    #[test]
    fn test_short_rows_do_not_panic() {
        let out = render(&["a", "b"], &[vec!["only".to_string()]]);
        assert!(out.lines().count() == 3);
    }
}
