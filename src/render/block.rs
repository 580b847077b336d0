//! Block rendering: paragraphs, lists, code, tables, admonitions and
//! sections.

use crate::model::{AdmonitionKind, Block, ListKind, Table};

use super::page::PageRenderer;
use super::roff::{macro_arg, normalize_quotes, Roff};

impl<'a> PageRenderer<'a> {
    /// Render blocks in order.
    pub(crate) fn render_blocks(&mut self, out: &mut Roff, blocks: &[Block]) {
        for block in blocks {
            self.render_block(out, block);
        }
    }

    /// Render blocks into a fresh, simplified buffer.
    pub(crate) fn blocks_roff(&mut self, blocks: &[Block]) -> Roff {
        let mut out = Roff::new();
        self.render_blocks(&mut out, blocks);
        out.simplify();
        out
    }

    /// Render blocks as the body of a tagged paragraph (`.TP`), where a
    /// paragraph break must keep the indentation.
    pub(crate) fn indented_roff(&mut self, blocks: &[Block]) -> Roff {
        let mut out = self.blocks_roff(blocks);
        out.rename_requests("PP", "IP");
        out
    }

    fn render_block(&mut self, out: &mut Roff, block: &Block) {
        match block {
            Block::Paragraph { content } => {
                self.stats.add_paragraph();
                out.request("PP");
                self.render_inline(out, content);
            }
            Block::List { kind, items } => self.render_list(out, *kind, items),
            Block::Table { table } => self.render_table(out, table),
            Block::Code { lines, .. } => self.render_code(out, lines),
            Block::Admonition { kind, body } => self.render_admonition(out, *kind, body),
            Block::Section { title, level, body } => {
                if *level > 1 {
                    log::debug!("Flattening level {} section '{}'", level, title);
                }
                if self.options.subsections && !title.trim().is_empty() {
                    out.request_with("SS", macro_arg(&capitalize(title.trim())));
                } else {
                    out.request("PP");
                }
                self.render_blocks(out, body);
            }
        }
    }

    fn render_list(&mut self, out: &mut Roff, kind: ListKind, items: &[Vec<Block>]) {
        out.request("RS");
        for (position, item) in items.iter().enumerate() {
            self.stats.add_list_item();
            match kind {
                ListKind::Bullet => out.request_with("IP", "\\[bu] 2"),
                ListKind::Ordered => {
                    let number = position + 1;
                    out.request_with("IP", format!("{}. {}", number, digits(number) + 2));
                }
            }
            // A paragraph break would push the item text below its marker.
            let mut body = Roff::new();
            self.render_blocks(&mut body, item);
            body.remove_requests("PP");
            out.append(body);
        }
        out.request("RE");
    }

    fn render_code(&mut self, out: &mut Roff, lines: &[String]) {
        self.stats.add_code_block();
        out.request("PP");
        out.request_with("in", "+4n");
        out.request("EX");
        for line in lines {
            out.line(normalize_quotes(&line.replace('\\', "\\\\")));
        }
        out.request("EE");
        out.request("in");
        out.request("PP");
    }

    fn render_table(&mut self, out: &mut Roff, table: &Table) {
        if table.is_empty() {
            return;
        }
        self.stats.add_table();
        let columns = table.column_count();
        for (row, cells) in table.short_rows() {
            self.report.malformed_table(row, cells, columns);
        }

        out.request("TS");
        out.line("allbox tab(|);");
        out.line(format!("{}.", vec!["l"; columns].join(" ")));

        for row in &table.rows {
            let mut cells: Vec<String> = row
                .cells
                .iter()
                .map(|cell| {
                    let text = self.inline_roff(&cell.content).plain();
                    escape_cell(text.trim())
                })
                .collect();
            cells.resize(columns, String::new());

            if row.is_header {
                let header: Vec<String> = cells
                    .iter()
                    .map(|cell| format!("\\f[B]{}\\f[R]", cell))
                    .collect();
                out.line(header.join("|"));
            } else {
                out.line("T{");
                for (position, cell) in cells.into_iter().enumerate() {
                    out.line(cell);
                    out.line(if position + 1 < columns { "T}|T{" } else { "T}" });
                }
            }
        }
        out.request("TE");
    }

    fn render_admonition(&mut self, out: &mut Roff, kind: AdmonitionKind, body: &[Block]) {
        self.stats.add_admonition();
        out.request("PP");
        out.request_with("RS", "4");
        out.text(format!("\\f[B]{}\\f[R] ", kind.label()));
        let body = self.blocks_roff(body);
        out.append(body);
        out.request("RE");
    }
}

fn digits(mut number: usize) -> usize {
    let mut count = 1;
    while number >= 10 {
        number /= 10;
        count += 1;
    }
    count
}

/// Upper-case the first letter and lower-case the rest.
fn capitalize(title: &str) -> String {
    let mut chars = title.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Escape the delimiters `tbl` reads inside a data row.
fn escape_cell(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '|' => out.push_str("\\[ba]"),
            '"' => out.push_str("\\[dq]"),
            ';' => out.push_str("\\[char59]"),
            other => out.push(other),
        }
    }
    if out.starts_with("T}") {
        out.insert_str(0, "\\&");
    }
    out
}
