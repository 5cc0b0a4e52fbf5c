/// A rendered monospace table plus its one-line title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub title: String,
    pub table: String,
}

pub fn pad_right(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        format!("{s}{}", " ".repeat(width - len))
    }
}

pub fn pad_left(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        format!("{}{s}", " ".repeat(width - len))
    }
}

/// Rounds to the nearest integer and inserts "." thousands separators.
pub fn group_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    if rounded < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Rank / name / total grid with a header and divider row. Widths grow to
/// fit the longest rendered value; minimums keep short tables readable.
pub fn simple_ranking_table(title: &str, rows: &[(String, f64)]) -> RenderedTable {
    let totals: Vec<String> = rows.iter().map(|(_, total)| group_thousands(*total)).collect();

    let name_width = rows
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0)
        .max(12);
    let total_width = totals.iter().map(|t| t.chars().count()).max().unwrap_or(0).max(6);

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format!(
        "{}  {}  {}",
        pad_left("#", 2),
        pad_right("NAME", name_width),
        pad_left("TOTAL", total_width)
    ));
    lines.push(format!(
        "--  {}  {}",
        "-".repeat(name_width),
        "-".repeat(total_width)
    ));

    for (i, ((name, _), total)) in rows.iter().zip(&totals).enumerate() {
        lines.push(format!(
            "{}  {}  {}",
            pad_left(&(i + 1).to_string(), 2),
            pad_right(name, name_width),
            pad_left(total, total_width)
        ));
    }

    RenderedTable {
        title: title.to_string(),
        table: lines.join("\n"),
    }
}
