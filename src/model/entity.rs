//! Documented entities and their members.

use super::{Block, Inline};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a documented entity.
///
/// The declaration order is also the naming precedence used when two
/// entities of different kinds would share a page name: earlier kinds keep
/// the plain name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Function
    Function,
    /// Preprocessor macro
    Macro,
    /// Global variable
    Variable,
    /// Type definition
    Typedef,
    /// Structure
    Struct,
    /// Union
    Union,
    /// Enumeration
    Enum,
    /// Header file
    File,
    /// Documentation group
    Group,
}

impl EntityKind {
    /// All kinds, in naming precedence order.
    pub const ALL: [EntityKind; 9] = [
        EntityKind::Function,
        EntityKind::Macro,
        EntityKind::Variable,
        EntityKind::Typedef,
        EntityKind::Struct,
        EntityKind::Union,
        EntityKind::Enum,
        EntityKind::File,
        EntityKind::Group,
    ];

    /// Short lowercase name, also used for kind-qualified page names.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Function => "function",
            EntityKind::Macro => "macro",
            EntityKind::Variable => "variable",
            EntityKind::Typedef => "typedef",
            EntityKind::Struct => "struct",
            EntityKind::Union => "union",
            EntityKind::Enum => "enum",
            EntityKind::File => "file",
            EntityKind::Group => "group",
        }
    }

    /// Struct or union.
    pub fn is_composite(&self) -> bool {
        matches!(self, EntityKind::Struct | EntityKind::Union)
    }

    /// Kinds that can be the target of a same-named typedef alias.
    pub fn is_aliasable(&self) -> bool {
        matches!(
            self,
            EntityKind::Struct | EntityKind::Union | EntityKind::Enum
        )
    }

    /// Kinds listed in file and group overview tables.
    pub fn is_listed(&self) -> bool {
        !matches!(
            self,
            EntityKind::File | EntityKind::Group | EntityKind::Typedef
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    /// Struct or union field
    Field,
    /// Enumeration constant
    Enumerator,
    /// Function or macro parameter
    Parameter,
}

/// A field, enumeration constant or parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Extractor id, when the extractor assigns one
    pub id: Option<String>,

    /// What this member is
    pub kind: MemberKind,

    /// Member name; empty for an unnamed parameter such as `void`
    pub name: String,

    /// Type as spelled in the declaration (empty for enumerators and macro parameters)
    pub type_spelling: String,

    /// Declarator suffix such as `[16]` or `: 3`
    pub suffix: String,

    /// Enumerator value, when written in the source
    pub initializer: Option<String>,

    /// Extractor id of the documented type the member's type refers to
    pub type_ref: Option<String>,

    /// One-line description
    pub brief: Vec<Inline>,

    /// Long description
    pub description: Vec<Block>,

    /// Zero-based position within the owner
    pub position: usize,
}

impl Member {
    /// Create a member of the given kind.
    pub fn new(kind: MemberKind, name: impl Into<String>) -> Self {
        Self {
            id: None,
            kind,
            name: name.into(),
            type_spelling: String::new(),
            suffix: String::new(),
            initializer: None,
            type_ref: None,
            brief: Vec::new(),
            description: Vec::new(),
            position: 0,
        }
    }

    /// Create a struct or union field.
    pub fn field(type_spelling: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(MemberKind::Field, name).with_type(type_spelling)
    }

    /// Create an enumeration constant.
    pub fn enumerator(name: impl Into<String>) -> Self {
        Self::new(MemberKind::Enumerator, name)
    }

    /// Create a function parameter.
    pub fn parameter(type_spelling: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(MemberKind::Parameter, name).with_type(type_spelling)
    }

    /// Set the type spelling.
    pub fn with_type(mut self, type_spelling: impl Into<String>) -> Self {
        self.type_spelling = type_spelling.into();
        self
    }

    /// Set the declarator suffix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Set the extractor id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set a plain-text brief.
    pub fn with_brief(mut self, brief: impl Into<String>) -> Self {
        self.brief = vec![Inline::text(brief)];
        self
    }

    /// Set the long description.
    pub fn with_description(mut self, description: Vec<Block>) -> Self {
        self.description = description;
        self
    }

    /// Render the declaration `type name suffix`, joining a pointer type
    /// directly to the name.
    pub fn declaration(&self) -> String {
        let mut decl = self.type_spelling.clone();
        if !self.name.is_empty() || !self.suffix.is_empty() {
            if !decl.is_empty() && !decl.ends_with('*') {
                decl.push(' ');
            }
            decl.push_str(&self.name);
            decl.push_str(&self.suffix);
        }
        decl
    }
}

/// Kind-specific declaration details used by the synopsis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    /// Return type, typedef'd type or variable type
    pub type_spelling: String,

    /// Argument string (`(int a, int b)`, `[4]`) as written by the extractor
    pub args: String,

    /// Extractor id of the documented type a typedef names
    pub type_ref: Option<String>,

    /// Macro replacement text
    pub initializer: Option<String>,

    /// Whether a macro takes a parameter list (possibly empty)
    pub function_like: bool,

    /// Typedef names folded into this entity's page
    pub aliases: Vec<String>,
}

/// A documented parameter group (`\param a, b description`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDoc {
    /// Parameter names sharing the description
    pub names: Vec<String>,

    /// Description
    pub description: Vec<Block>,
}

/// A documented return value (`\retval`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnValue {
    /// The value, as written
    pub value: String,

    /// Description
    pub description: Vec<Block>,
}

/// Documentation attached to an entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Documentation {
    /// Long description
    pub description: Vec<Block>,

    /// Parameter documentation, in documentation order
    pub params: Vec<ParamDoc>,

    /// `\return` text
    pub returns: Vec<Block>,

    /// `\retval` entries
    pub return_values: Vec<ReturnValue>,

    /// `\author` / `\authors` entries
    pub authors: Vec<Vec<Block>>,

    /// `\bug` entries
    pub bugs: Vec<Vec<Block>>,

    /// `\deprecated` entries
    pub deprecated: Vec<Vec<Block>>,

    /// `\see` content; rendered only for the references it contains
    pub see_also: Vec<Inline>,
}

impl Documentation {
    /// Check whether nothing is documented.
    pub fn is_empty(&self) -> bool {
        self.description.is_empty()
            && self.params.is_empty()
            && self.returns.is_empty()
            && self.return_values.is_empty()
            && self.authors.is_empty()
            && self.bugs.is_empty()
            && self.deprecated.is_empty()
            && self.see_also.is_empty()
    }
}

/// A documented entity; each entity receives one manual page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Extractor id, unique within a document
    pub id: String,

    /// Entity kind
    pub kind: EntityKind,

    /// Qualified name (`foo`, `Frob`, `foo.h`, group identifier)
    pub name: String,

    /// Display title (groups)
    pub title: Option<String>,

    /// Header shown in the synopsis `#include` line
    pub header: Option<String>,

    /// Id of the group the entity is declared in
    pub group: Option<String>,

    /// One-line description
    pub brief: Vec<Inline>,

    /// Long description and tagged sections
    pub docs: Documentation,

    /// Fields, enumerators or parameters, in declaration order
    pub members: Vec<Member>,

    /// Declaration details
    pub declaration: Declaration,

    /// Ids of entities contained in a file or group
    pub contents: Vec<String>,
}

impl Entity {
    /// Create a new entity.
    pub fn new(id: impl Into<String>, kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            title: None,
            header: None,
            group: None,
            brief: Vec::new(),
            docs: Documentation::default(),
            members: Vec::new(),
            declaration: Declaration::default(),
            contents: Vec::new(),
        }
    }

    /// Set the header file.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Set the owning group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set a plain-text brief.
    pub fn with_brief(mut self, brief: impl Into<String>) -> Self {
        self.brief = vec![Inline::text(brief)];
        self
    }

    /// Set the long description.
    pub fn with_description(mut self, description: Vec<Block>) -> Self {
        self.docs.description = description;
        self
    }

    /// Set the declared type (return type for functions).
    pub fn with_type(mut self, type_spelling: impl Into<String>) -> Self {
        self.declaration.type_spelling = type_spelling.into();
        self
    }

    /// Add a member, assigning its position.
    pub fn add_member(&mut self, mut member: Member) {
        member.position = self.members.len();
        self.members.push(member);
    }

    /// Add a member and return self.
    pub fn with_member(mut self, member: Member) -> Self {
        self.add_member(member);
        self
    }

    /// Name shown in headings: the title for groups, the name otherwise.
    pub fn display_name(&self) -> &str {
        match (&self.kind, &self.title) {
            (EntityKind::Group, Some(title)) if !title.is_empty() => title,
            _ => &self.name,
        }
    }

    /// Names of declared parameters, for functions and macros.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.members
            .iter()
            .filter(|m| m.kind == MemberKind::Parameter && !m.name.is_empty())
            .map(|m| m.name.as_str())
    }

    /// Short description such as `struct Frob`, used in diagnostics.
    pub fn describe(&self) -> String {
        format!("{} {}", self.kind, self.name)
    }
}
