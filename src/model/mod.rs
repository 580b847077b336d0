//! Documentation model types.
//!
//! This module defines the intermediate representation that bridges the
//! extractor's XML output and manual page rendering. Content is a closed
//! set of tagged variants ([`Inline`] and [`Block`]) so every node kind has
//! exactly one rendering rule.

mod block;
mod document;
mod entity;
mod inline;
mod table;

pub use block::{blocks_plain_text, AdmonitionKind, Block, ListKind};
pub use document::{Document, Example, ProjectInfo};
pub use entity::{
    Declaration, Documentation, Entity, EntityKind, Member, MemberKind, ParamDoc, ReturnValue,
};
pub use inline::{merge_runs, plain_text, Inline, LinkTarget, LiteralEntity, Style};
pub use table::{Table, TableCell, TableRow};
