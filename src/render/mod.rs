//! Rendering module for converting documentation models to manual pages.

mod block;
mod emit;
mod inline;
mod json;
mod options;
mod page;
mod report;
mod result;
pub mod roff;
mod sentence;

pub use emit::title_macro;
pub use json::{to_json, JsonFormat};
pub use options::{format_date, RenderOptions};
pub use report::Warning;
pub use result::{ManPage, RenderResult, RenderStats};
pub use sentence::segment;

use rayon::prelude::*;

use crate::error::Result;
use crate::index::ReferenceIndex;
use crate::model::{Document, Entity};

use page::{PageRenderer, RenderedPage};

/// Render every entity of a document to a manual page.
pub fn to_man_pages(doc: &Document, options: &RenderOptions) -> Result<RenderResult> {
    let renderer = ManRenderer::new(options.clone());
    renderer.render(doc)
}

/// Manual page renderer.
///
/// Pages are independent once the [`ReferenceIndex`] is built, so they may
/// be rendered on the rayon pool; the result lists pages in entity order
/// either way.
#[derive(Debug, Clone, Default)]
pub struct ManRenderer {
    options: RenderOptions,
}

impl ManRenderer {
    /// Create a new manual page renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Build the reference index and render every page.
    pub fn render(&self, doc: &Document) -> Result<RenderResult> {
        self.options.validate()?;
        let index = ReferenceIndex::build(doc, self.options.section)?;
        self.render_with_index(&index)
    }

    /// Render every page against an existing index.
    pub fn render_with_index(&self, index: &ReferenceIndex<'_>) -> Result<RenderResult> {
        self.options.validate()?;
        let entities = &index.document().entities;

        let rendered: Vec<RenderedPage> = if self.options.parallel {
            entities
                .par_iter()
                .map(|entity| self.render_entity(index, entity))
                .collect::<Result<Vec<_>>>()?
        } else {
            entities
                .iter()
                .map(|entity| self.render_entity(index, entity))
                .collect::<Result<Vec<_>>>()?
        };

        let mut result = RenderResult::default();
        for page in rendered {
            result.stats.merge(&page.stats);
            result.warnings.extend(page.warnings);
            result.pages.push(page.page);
        }

        log::debug!(
            "Rendered {} pages with {} warnings",
            result.pages.len(),
            result.warnings.len()
        );
        Ok(result)
    }

    /// Render the page of a single entity.
    pub fn render_page(&self, index: &ReferenceIndex<'_>, entity: &Entity) -> Result<(ManPage, Vec<Warning>)> {
        let rendered = self.render_entity(index, entity)?;
        Ok((rendered.page, rendered.warnings))
    }

    fn render_entity(&self, index: &ReferenceIndex<'_>, entity: &Entity) -> Result<RenderedPage> {
        let renderer = PageRenderer::new(index, &self.options, entity)?;
        Ok(renderer.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityKind, Inline, Member};

    fn document() -> Document {
        let mut doc = Document::new();
        for n in 0..8 {
            doc.add_entity(
                Entity::new(format!("f{}", n), EntityKind::Function, format!("fn{}", n))
                    .with_header("lib.h")
                    .with_type("int")
                    .with_brief(format!("Function number {}.", n))
                    .with_member(Member::parameter("int", "x")),
            );
        }
        doc.entities[0].brief.push(Inline::link("fn1"));
        doc.entities[1].brief.push(Inline::link("missing"));
        doc
    }

    #[test]
    fn test_render_all_pages_in_order() {
        let doc = document();
        let result = to_man_pages(&doc, &RenderOptions::default()).unwrap();
        let names: Vec<&str> = result.pages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["fn0", "fn1", "fn2", "fn3", "fn4", "fn5", "fn6", "fn7"]);
        assert_eq!(result.stats.page_count, 8);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.pages.iter().all(|p| p.content.ends_with('\n')));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let doc = document();
        let sequential = to_man_pages(&doc, &RenderOptions::default()).unwrap();
        let parallel = to_man_pages(&doc, &RenderOptions::default().with_parallel(true)).unwrap();
        assert_eq!(sequential.pages, parallel.pages);
        assert_eq!(sequential.warnings, parallel.warnings);
        assert_eq!(sequential.stats, parallel.stats);
    }

    #[test]
    fn test_invalid_section_rejected() {
        let doc = document();
        assert!(to_man_pages(&doc, &RenderOptions::default().with_section(0)).is_err());
    }

    #[test]
    fn test_render_single_page() {
        let doc = document();
        let index = ReferenceIndex::build(&doc, 3).unwrap();
        let renderer = ManRenderer::default();
        let (page, warnings) = renderer.render_page(&index, &doc.entities[0]).unwrap();
        assert_eq!(page.file_name(), "fn0.3");
        assert!(warnings.is_empty());
        assert!(page.content.contains(".SH SEE ALSO\n.BR fn1 (3)\n"));
    }
}
