//! Table and export generation.
//!
//! Renders dashboard rows as a paginated text table, CSV, JSON or a
//! Markdown table. Column order and headers come from [`Field::ALL`].

use crate::models::{Export, Field, MergedRecord};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Widest a text-table cell may get before it is truncated.
const MAX_CELL_WIDTH: usize = 48;

/// Position of a rendered page within the view.
#[derive(Debug, Clone, Copy)]
pub struct PageInfo {
    /// Zero-based page index.
    pub index: usize,
    pub count: usize,
    /// Rows in the whole view, across pages.
    pub total_rows: usize,
    pub can_previous: bool,
    pub can_next: bool,
}

/// Generate one page of the dashboard as an aligned text table.
pub fn generate_table_page(rows: &[&MergedRecord], page: &PageInfo) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| Field::ALL.iter().map(|f| truncate(r.get(*f))).collect())
        .collect();

    let widths: Vec<usize> = Field::ALL
        .iter()
        .enumerate()
        .map(|(i, field)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(field.label().chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut output = String::new();

    let header: Vec<String> = Field::ALL
        .iter()
        .zip(&widths)
        .map(|(field, w)| pad(field.label(), *w))
        .collect();
    output.push_str(header.join(" | ").trim_end());
    output.push('\n');

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    output.push_str(&rule.join("-+-"));
    output.push('\n');

    if cells.is_empty() {
        output.push_str("(no matching books)\n");
    }

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| pad(cell, *w))
            .collect();
        output.push_str(line.join(" | ").trim_end());
        output.push('\n');
    }

    output.push('\n');
    output.push_str(&generate_page_footer(page));

    output
}

/// Footer line with page position and navigation hints.
fn generate_page_footer(page: &PageInfo) -> String {
    let mut footer = format!(
        "Page {} of {} ({} books)",
        page.index + 1,
        page.count,
        page.total_rows
    );

    if page.can_previous {
        footer.push_str(&format!("  [--page {} for previous]", page.index));
    }
    if page.can_next {
        footer.push_str(&format!("  [--page {} for next]", page.index + 2));
    }
    footer.push('\n');

    footer
}

fn truncate(value: &str) -> String {
    if value.chars().count() <= MAX_CELL_WIDTH {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(MAX_CELL_WIDTH - 1).collect();
    cut.push('…');
    cut
}

fn pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    format!("{}{}", value, " ".repeat(width.saturating_sub(len)))
}

/// Generate CSV with a header row of column labels.
///
/// Every value is quoted; embedded quotes are doubled.
pub fn generate_csv(rows: &[&MergedRecord]) -> String {
    let mut output = String::new();

    let header: Vec<String> = Field::ALL.iter().map(|f| quote_csv(f.label())).collect();
    output.push_str(&header.join(","));
    output.push_str("\r\n");

    for record in rows {
        let line: Vec<String> = Field::ALL
            .iter()
            .map(|f| quote_csv(record.get(*f)))
            .collect();
        output.push_str(&line.join(","));
        output.push_str("\r\n");
    }

    output
}

fn quote_csv(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Generate a Markdown report with a metadata header and one table.
pub fn generate_markdown_report(export: &Export) -> String {
    let mut output = String::new();

    output.push_str("# Book Catalog\n\n");

    output.push_str(&format!("- **Subject:** {}\n", export.metadata.subject));
    output.push_str(&format!(
        "- **Generated:** {}\n",
        export.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("- **Books:** {}\n", export.metadata.record_count));
    if export.metadata.degraded_count > 0 {
        output.push_str(&format!(
            "- **Incomplete enrichment:** {}\n",
            export.metadata.degraded_count
        ));
    }
    if let Some(ref filter) = export.metadata.filter {
        output.push_str(&format!("- **Filter:** `{}`\n", filter));
    }
    output.push('\n');

    let header: Vec<&str> = Field::ALL.iter().map(|f| f.label()).collect();
    output.push_str(&format!("| {} |\n", header.join(" | ")));
    output.push_str(&format!("|{}\n", ":---|".repeat(Field::ALL.len())));

    for record in &export.records {
        let cells: Vec<String> = Field::ALL
            .iter()
            .map(|f| escape_markdown(record.get(*f)))
            .collect();
        output.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    output
}

fn escape_markdown(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

/// Generate a JSON report.
pub fn generate_json_report(export: &Export) -> Result<String> {
    serde_json::to_string_pretty(export).map_err(Into::into)
}

/// Write generated content to a file.
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NOT_AVAILABLE;

    fn create_test_record(title: &str) -> MergedRecord {
        MergedRecord {
            title: title.to_string(),
            author_name: "Ursula K. Le Guin".to_string(),
            first_publish_year: "1969".to_string(),
            subject: "Science fiction, Gender".to_string(),
            ratings_average: "4.1".to_string(),
            author_birth_date: "21 October 1929".to_string(),
            author_top_work: NOT_AVAILABLE.to_string(),
            degraded: false,
        }
    }

    fn first_page(total: usize) -> PageInfo {
        PageInfo {
            index: 0,
            count: 2,
            total_rows: total,
            can_previous: false,
            can_next: true,
        }
    }

    #[test]
    fn test_generate_table_page() {
        let record = create_test_record("The Left Hand of Darkness");
        let table = generate_table_page(&[&record], &first_page(12));

        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].starts_with("Title"));
        assert!(lines[0].contains("Author Top Work"));
        assert!(lines[2].contains("The Left Hand of Darkness"));
        assert!(table.contains("Page 1 of 2 (12 books)"));
        assert!(table.contains("--page 2 for next"));
        assert!(!table.contains("previous"));
    }

    #[test]
    fn test_table_truncates_long_cells() {
        let mut record = create_test_record("Short");
        record.subject = "x".repeat(100);
        let table = generate_table_page(&[&record], &first_page(1));

        assert!(!table.contains(&"x".repeat(MAX_CELL_WIDTH)));
        assert!(table.contains('…'));
    }

    #[test]
    fn test_empty_table_page() {
        let table = generate_table_page(
            &[],
            &PageInfo {
                index: 0,
                count: 1,
                total_rows: 0,
                can_previous: false,
                can_next: false,
            },
        );
        assert!(table.contains("(no matching books)"));
        assert!(table.contains("Page 1 of 1 (0 books)"));
    }

    #[test]
    fn test_generate_csv() {
        let mut record = create_test_record("The \"Dispossessed\"");
        record.subject = "Anarchism, Utopias".to_string();
        let csv = generate_csv(&[&record]);

        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(
            lines[0],
            "\"Title\",\"Author Name\",\"First Publish Year\",\"Subject\",\"Ratings Average\",\"Author Birth Date\",\"Author Top Work\""
        );
        assert!(lines[1].starts_with("\"The \"\"Dispossessed\"\"\",\"Ursula K. Le Guin\""));
        assert!(lines[1].contains("\"Anarchism, Utopias\""));
        assert!(lines[1].ends_with("\"N/A\""));
    }

    #[test]
    fn test_generate_markdown_report() {
        let export = Export::new(
            "science_fiction",
            vec![create_test_record("A | B")],
            Some("le guin".to_string()),
        );
        let markdown = generate_markdown_report(&export);

        assert!(markdown.contains("# Book Catalog"));
        assert!(markdown.contains("**Subject:** science_fiction"));
        assert!(markdown.contains("**Filter:** `le guin`"));
        assert!(markdown.contains("| Title | Author Name |"));
        assert!(markdown.contains("A \\| B"));
        assert!(!markdown.contains("Incomplete enrichment"));
    }

    #[test]
    fn test_generate_json_report() {
        let export = Export::new("science_fiction", vec![create_test_record("Dune")], None);
        let json = generate_json_report(&export).unwrap();

        assert!(json.contains("\"record_count\": 1"));
        assert!(json.contains("\"author_top_work\": \"N/A\""));
        assert!(!json.contains("degraded\":"));
        assert!(!json.contains("\"filter\""));
    }

    #[test]
    fn test_write_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.csv");
        let record = create_test_record("Dune");

        write_output(&path, &generate_csv(&[&record])).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"Dune\""));
    }
}
