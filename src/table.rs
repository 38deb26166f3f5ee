// Plain-text tables: a header row, a dashed rule and left-aligned columns,
// optionally prefixed with a zero-based row index.

use std::fmt;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    show_index: bool,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Table {
            headers: headers.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Prefix every row with its position, so users can pick one by number.
    pub fn with_index(mut self) -> Self {
        self.show_index = true;
        self
    }

    /// Rows shorter than the header are padded with empty cells.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        row.resize(self.headers.len().max(row.len()), String::new());
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn lines(&self) -> Vec<Vec<String>> {
        let mut header = self.headers.clone();
        let mut body = self.rows.clone();
        if self.show_index {
            header.insert(0, String::new());
            for (i, row) in body.iter_mut().enumerate() {
                row.insert(0, i.to_string());
            }
        }
        let mut lines = vec![header];
        lines.extend(body);
        lines
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self.lines();
        let columns = lines.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0; columns];
        for line in &lines {
            for (w, cell) in widths.iter_mut().zip(line) {
                *w = (*w).max(UnicodeWidthStr::width(cell.as_str()));
            }
        }

        let mut iter = lines.iter();
        if let Some(header) = iter.next() {
            render_line(f, &widths, header)?;
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            render_line(f, &widths, &rule)?;
        }
        for line in iter {
            render_line(f, &widths, line)?;
        }
        Ok(())
    }
}

fn render_line(f: &mut fmt::Formatter<'_>, widths: &[usize], cells: &[String]) -> fmt::Result {
    let mut out = String::new();
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(cell);
        out.push_str(&" ".repeat(w.saturating_sub(UnicodeWidthStr::width(cell))));
    }
    writeln!(f, "{}", out.trim_end())
}
