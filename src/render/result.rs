//! Rendering result with pages, warnings and statistics.

use crate::model::EntityKind;
use serde::{Deserialize, Serialize};

use super::Warning;

/// One rendered manual page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManPage {
    /// Page name without section (`foo`, `frob_struct`)
    pub name: String,

    /// Manual section
    pub section: u8,

    /// Extractor id of the entity the page documents
    pub entity_id: String,

    /// Kind of the documented entity
    pub kind: EntityKind,

    /// Complete roff source, newline terminated
    pub content: String,
}

impl ManPage {
    /// File name of the page, e.g. `foo.3`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.section)
    }

    /// Get the content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Result of rendering a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderResult {
    /// Rendered pages, in entity order
    pub pages: Vec<ManPage>,

    /// Recoverable defects found while rendering
    pub warnings: Vec<Warning>,

    /// Rendering statistics
    pub stats: RenderStats,
}

impl RenderResult {
    /// Get a page by name.
    pub fn page(&self, name: &str) -> Option<&ManPage> {
        self.pages.iter().find(|p| p.name == name)
    }

    /// Get the number of rendered pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Check if rendering produced any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Statistics collected during rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStats {
    /// Number of pages rendered
    pub page_count: u32,

    /// Number of paragraphs rendered
    pub paragraph_count: u32,

    /// Number of tables rendered (content tables and overview tables)
    pub table_count: u32,

    /// Number of code blocks rendered
    pub code_block_count: u32,

    /// Number of list items rendered
    pub list_item_count: u32,

    /// Number of admonitions rendered
    pub admonition_count: u32,

    /// Number of links that resolved to a page
    pub reference_count: u32,

    /// Total bytes of roff output
    pub byte_count: u64,
}

impl RenderStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment page count.
    pub fn add_page(&mut self) {
        self.page_count += 1;
    }

    /// Increment paragraph count.
    pub fn add_paragraph(&mut self) {
        self.paragraph_count += 1;
    }

    /// Increment table count.
    pub fn add_table(&mut self) {
        self.table_count += 1;
    }

    /// Increment code block count.
    pub fn add_code_block(&mut self) {
        self.code_block_count += 1;
    }

    /// Increment list item count.
    pub fn add_list_item(&mut self) {
        self.list_item_count += 1;
    }

    /// Increment admonition count.
    pub fn add_admonition(&mut self) {
        self.admonition_count += 1;
    }

    /// Increment resolved reference count.
    pub fn add_reference(&mut self) {
        self.reference_count += 1;
    }

    /// Add the size of rendered output.
    pub fn count_output(&mut self, content: &str) {
        self.byte_count += content.len() as u64;
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &RenderStats) {
        self.page_count += other.page_count;
        self.paragraph_count += other.paragraph_count;
        self.table_count += other.table_count;
        self.code_block_count += other.code_block_count;
        self.list_item_count += other.list_item_count;
        self.admonition_count += other.admonition_count;
        self.reference_count += other.reference_count;
        self.byte_count += other.byte_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_stats_merge() {
        let mut stats1 = RenderStats::new();
        stats1.paragraph_count = 5;
        stats1.table_count = 2;

        let stats2 = RenderStats {
            paragraph_count: 3,
            table_count: 1,
            reference_count: 4,
            ..Default::default()
        };

        stats1.merge(&stats2);

        assert_eq!(stats1.paragraph_count, 8);
        assert_eq!(stats1.table_count, 3);
        assert_eq!(stats1.reference_count, 4);
    }

    #[test]
    fn test_count_output() {
        let mut stats = RenderStats::new();
        stats.count_output(".TH \"FOO\" \"3\"\n");
        assert_eq!(stats.byte_count, 15);
    }

    #[test]
    fn test_man_page_file_name() {
        let page = ManPage {
            name: "frob_struct".to_string(),
            section: 3,
            entity_id: "structfrob".to_string(),
            kind: EntityKind::Struct,
            content: String::new(),
        };
        assert_eq!(page.file_name(), "frob_struct.3");
        assert_eq!(page.content_len(), 0);
    }

    #[test]
    fn test_render_result_lookup() {
        let result = RenderResult {
            pages: vec![ManPage {
                name: "foo".to_string(),
                section: 3,
                entity_id: "foo_8h_1a".to_string(),
                kind: EntityKind::Function,
                content: "x\n".to_string(),
            }],
            ..Default::default()
        };
        assert_eq!(result.page_count(), 1);
        assert!(result.page("foo").is_some());
        assert!(result.page("bar").is_none());
        assert!(!result.has_warnings());
    }
}
