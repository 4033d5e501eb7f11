//! The small slice of markdown the model writes, converted to HTML.
//!
//! Handled: `#`/`##`/`###` headings, `-`/`*` bullets, pipe tables (the
//! `|---|` separator is skipped, short rows are padded), and `**bold**` /
//! `*italic*` runs. Anything else is a paragraph. An unclosed marker is
//! kept literally.

use std::fmt::Write;

/// A run of inline text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Bold(String),
    Italic(String),
}

/// A block-level element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, spans: Vec<Span> },
    Paragraph(Vec<Span>),
    List(Vec<Vec<Span>>),
    /// First row is the header. Every row has the same number of cells.
    Table(Vec<Vec<String>>),
}

/// Split `line` into plain, bold and italic runs.
pub fn parse_inline(line: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let push_text = |spans: &mut Vec<Span>, text: &str| {
        if !text.is_empty() {
            spans.push(Span::Text(text.to_string()));
        }
    };

    let mut remaining = line;
    while !remaining.is_empty() {
        let Some(star) = remaining.find('*') else {
            push_text(&mut spans, remaining);
            break;
        };

        let (marker, bold) = if remaining[star..].starts_with("**") {
            ("**", true)
        } else {
            ("*", false)
        };
        let after = &remaining[star + marker.len()..];
        let Some(end) = after.find(marker) else {
            push_text(&mut spans, remaining);
            break;
        };

        push_text(&mut spans, &remaining[..star]);
        let inner = after[..end].to_string();
        spans.push(if bold {
            Span::Bold(inner)
        } else {
            Span::Italic(inner)
        });
        remaining = &after[end + marker.len()..];
    }

    spans
}

fn is_table_row(line: &str) -> bool {
    let s = line.trim();
    s.len() >= 2 && s.starts_with('|') && s.ends_with('|')
}

fn is_table_separator(line: &str) -> bool {
    let s = line.trim();
    is_table_row(s) && s[1..s.len() - 1].chars().all(|c| matches!(c, '|' | '-' | ':' | ' '))
}

fn table_cells(line: &str) -> Vec<String> {
    let mut cells: Vec<&str> = line.trim().split('|').map(str::trim).collect();
    if cells.first() == Some(&"") {
        cells.remove(0);
    }
    if cells.last() == Some(&"") {
        cells.pop();
    }
    cells.into_iter().map(str::to_string).collect()
}

fn parse_table(lines: &[&str]) -> Option<Block> {
    let mut rows: Vec<Vec<String>> = lines
        .iter()
        .filter(|line| !is_table_separator(line))
        .map(|line| table_cells(line))
        .filter(|cells| !cells.is_empty())
        .collect();

    let columns = rows.iter().map(Vec::len).max()?;
    for row in &mut rows {
        row.resize(columns, String::new());
    }
    Some(Block::Table(rows))
}

fn bullet_text(line: &str) -> Option<&str> {
    if line.starts_with("**") {
        return None;
    }
    line.strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .map(str::trim)
}

fn heading(line: &str) -> Option<(u8, &str)> {
    [("### ", 3), ("## ", 2), ("# ", 1)]
        .into_iter()
        .find_map(|(prefix, level)| line.strip_prefix(prefix).map(|rest| (level, rest.trim())))
}

/// Parse markdown text into blocks. Blank lines only separate blocks.
pub fn parse_blocks(text: &str) -> Vec<Block> {
    let lines: Vec<&str> = text.trim().lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();

        if is_table_row(line) {
            let start = i;
            while i < lines.len() && is_table_row(lines[i]) {
                i += 1;
            }
            blocks.extend(parse_table(&lines[start..i]));
            continue;
        }

        if let Some(item) = bullet_text(line) {
            let spans = parse_inline(item);
            match blocks.last_mut() {
                Some(Block::List(items)) if i > 0 && bullet_text(lines[i - 1].trim()).is_some() => {
                    items.push(spans)
                }
                _ => blocks.push(Block::List(vec![spans])),
            }
        } else if let Some((level, rest)) = heading(line) {
            blocks.push(Block::Heading {
                level,
                spans: parse_inline(rest),
            });
        } else if !line.is_empty() {
            blocks.push(Block::Paragraph(parse_inline(line)));
        }
        i += 1;
    }

    blocks
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
}

fn spans_into(out: &mut String, spans: &[Span]) {
    for span in spans {
        match span {
            Span::Text(text) => escape_into(out, text),
            Span::Bold(text) => {
                out.push_str("<strong>");
                escape_into(out, text);
                out.push_str("</strong>");
            }
            Span::Italic(text) => {
                out.push_str("<em>");
                escape_into(out, text);
                out.push_str("</em>");
            }
        }
    }
}

/// Render blocks as an HTML fragment. All text is escaped.
pub fn blocks_to_html(blocks: &[Block]) -> String {
    let mut out = String::new();

    for block in blocks {
        match block {
            Block::Heading { level, spans } => {
                let _ = write!(out, "<h{level}>");
                spans_into(&mut out, spans);
                let _ = writeln!(out, "</h{level}>");
            }
            Block::Paragraph(spans) => {
                out.push_str("<p>");
                spans_into(&mut out, spans);
                out.push_str("</p>\n");
            }
            Block::List(items) => {
                out.push_str("<ul>\n");
                for item in items {
                    out.push_str("<li>");
                    spans_into(&mut out, item);
                    out.push_str("</li>\n");
                }
                out.push_str("</ul>\n");
            }
            Block::Table(rows) => {
                out.push_str("<table>\n");
                for (i, row) in rows.iter().enumerate() {
                    let tag = if i == 0 { "th" } else { "td" };
                    out.push_str("<tr>");
                    for cell in row {
                        let _ = write!(out, "<{tag}>");
                        spans_into(&mut out, &parse_inline(cell));
                        let _ = write!(out, "</{tag}>");
                    }
                    out.push_str("</tr>\n");
                }
                out.push_str("</table>\n");
            }
        }
    }

    out
}

/// Parse and render in one step.
pub fn markdown_to_html(text: &str) -> String {
    blocks_to_html(&parse_blocks(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Span {
        Span::Text(s.to_string())
    }

    #[test]
    fn inline_runs() {
        assert_eq!(
            parse_inline("Trains are **on time** and *mostly* empty"),
            vec![
                text("Trains are "),
                Span::Bold("on time".into()),
                text(" and "),
                Span::Italic("mostly".into()),
                text(" empty"),
            ]
        );
    }

    #[test]
    fn unclosed_markers_stay_literal() {
        assert_eq!(parse_inline("**half bold"), vec![text("**half bold")]);
        assert_eq!(parse_inline("a *b"), vec![text("a *b")]);
        assert_eq!(
            parse_inline("*x* then **y"),
            vec![Span::Italic("x".into()), text(" then **y")]
        );
    }

    #[test]
    fn headings_and_bullets() {
        let blocks = parse_blocks("# Title\n\n## Alerts\n- one\n* **two**\n\nAfter.");

        assert_eq!(
            blocks,
            vec![
                Block::Heading {
                    level: 1,
                    spans: vec![text("Title")]
                },
                Block::Heading {
                    level: 2,
                    spans: vec![text("Alerts")]
                },
                Block::List(vec![vec![text("one")], vec![Span::Bold("two".into())]]),
                Block::Paragraph(vec![text("After.")]),
            ]
        );
    }

    #[test]
    fn bold_line_is_not_a_bullet() {
        let blocks = parse_blocks("**Note:** trains run");
        assert!(matches!(blocks[0], Block::Paragraph(_)));
    }

    #[test]
    fn tables_skip_separator_and_pad_rows() {
        let blocks = parse_blocks(
            "| Train | Destination | Status |\n\
             |---|:---:|---|\n\
             | 1234 | Ashmont | On Time |\n\
             | 5678 | Braintree |",
        );

        assert_eq!(
            blocks,
            vec![Block::Table(vec![
                vec!["Train".into(), "Destination".into(), "Status".into()],
                vec!["1234".into(), "Ashmont".into(), "On Time".into()],
                vec!["5678".into(), "Braintree".into(), String::new()],
            ])]
        );
    }

    #[test]
    fn separate_lists_stay_separate() {
        let blocks = parse_blocks("- a\n\n- b");
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn html_is_escaped() {
        let html = markdown_to_html("Use <b> & **\"quotes\"**\n| a<b |\n|---|\n| *x* |");

        assert!(html.contains("<p>Use &lt;b&gt; &amp; <strong>&quot;quotes&quot;</strong></p>"));
        assert!(html.contains("<th>a&lt;b</th>"));
        assert!(html.contains("<td><em>x</em></td>"));
    }
}
