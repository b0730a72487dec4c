//! Data model for extracted documentation — format-agnostic.
//!
//! Blocks and directives are transient per-file values. `DocModel` is the
//! only long-lived structure and is handed to renderers as-is.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// One documentation comment found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommentBlock {
    pub file_path: String,
    pub package_name: String,
    /// Trimmed, non-empty content lines.
    pub lines: Vec<String>,
}

/// A `@name value` tag line, with children when it opened a `{ … }` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Directive {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Directive>,
}

impl Directive {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Directive {
            name: name.into(),
            value: value.into(),
            children: Vec::new(),
        }
    }

    pub fn is_block(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Entity kind selected by a block's `-- KIND` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    File,
    Package,
    Type,
    Variable,
    Function,
    /// No recognized header. Kept as its own kind instead of guessing one.
    Uncategorized,
}

impl EntityKind {
    /// Match a header keyword (`FILE`, `PKG`, `FUNC`, …), case-insensitively.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "FILE" => Some(EntityKind::File),
            "PKG" | "PACKAGE" => Some(EntityKind::Package),
            "TYPE" => Some(EntityKind::Type),
            "VAR" | "VARIABLE" => Some(EntityKind::Variable),
            "FUNC" | "FUNCTION" => Some(EntityKind::Function),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::File => "FILE",
            EntityKind::Package => "PKG",
            EntityKind::Type => "TYPE",
            EntityKind::Variable => "VAR",
            EntityKind::Function => "FUNC",
            EntityKind::Uncategorized => "uncategorized",
        };
        f.write_str(s)
    }
}

/// Lexed block: the header's kind plus its directive tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagBlock {
    pub kind: EntityKind,
    /// Text lines that appeared before the first tag.
    pub preamble: String,
    pub directives: Vec<Directive>,
}

/// A single parsed documentation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocRecord {
    File(FileDoc),
    Package(PackageDoc),
    Type(TypeDoc),
    Variable(VariableDoc),
    Function(FunctionDoc),
    Uncategorized(UncategorizedDoc),
}

impl DocRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            DocRecord::File(_) => EntityKind::File,
            DocRecord::Package(_) => EntityKind::Package,
            DocRecord::Type(_) => EntityKind::Type,
            DocRecord::Variable(_) => EntityKind::Variable,
            DocRecord::Function(_) => EntityKind::Function,
            DocRecord::Uncategorized(_) => EntityKind::Uncategorized,
        }
    }
}

/// `-- FILE` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileDoc {
    pub path: String,
    /// @file
    pub name: String,
    /// @desc
    pub description: String,
    /// @auth
    pub author: String,
    /// @v
    pub version: String,
    /// @date
    pub date: String,
}

/// `-- PKG` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageDoc {
    pub name: String,
    pub description: String,
    pub usage: String,
    pub dependencies: Vec<DependencyDoc>,
}

/// One `@dep` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyDoc {
    pub name: String,
    pub description: String,
    pub link: String,
    pub import_path: String,
}

impl DependencyDoc {
    /// Key used for de-duplication: the import path, or the name when no
    /// import path was given.
    pub fn dedup_key(&self) -> &str {
        if self.import_path.is_empty() {
            &self.name
        } else {
            &self.import_path
        }
    }
}

/// `-- TYPE` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeDoc {
    pub name: String,
    pub description: String,
    pub fields: Vec<FieldDoc>,
    pub exported: bool,
    /// Indices into the owning package's `functions`, set during assembly.
    pub methods: Vec<usize>,
}

/// `@field name (type): description` and `@param` share this shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub description: String,
}

pub type ParamDoc = FieldDoc;

/// `-- VAR` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariableDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub description: String,
    pub exported: bool,
}

/// `-- FUNC` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FunctionDoc {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamDoc>,
    pub returns: Vec<ReturnDoc>,
    pub responses: Vec<ResponseDoc>,
    /// @rec, or the receiver written in a `(h *T) Name` signature.
    pub receiver: Option<String>,
    pub examples: Vec<ExampleDoc>,
    pub exported: bool,
    /// Index into the owning package's `types`, set during assembly.
    pub receiver_type: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReturnDoc {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub description: String,
    pub is_error: bool,
}

/// `@res 404 Not Found - …`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResponseDoc {
    pub code: u16,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExampleDoc {
    pub code: String,
    pub description: String,
}

/// A block without a recognized header, kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UncategorizedDoc {
    pub path: String,
    pub preamble: String,
    pub directives: Vec<Directive>,
}

/// Aggregate documentation for one source package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageModel {
    pub name: String,
    pub description: String,
    pub usage: String,
    pub dependencies: Vec<DependencyDoc>,
    pub files: Vec<FileDoc>,
    pub types: Vec<TypeDoc>,
    pub variables: Vec<VariableDoc>,
    pub functions: Vec<FunctionDoc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub uncategorized: Vec<UncategorizedDoc>,
}

impl PackageModel {
    pub fn new(name: impl Into<String>) -> Self {
        PackageModel {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn type_named(&self, name: &str) -> Option<&TypeDoc> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Functions linked to `ty` as their receiver.
    pub fn methods_of<'a>(&'a self, ty: &'a TypeDoc) -> impl Iterator<Item = &'a FunctionDoc> {
        ty.methods.iter().filter_map(|&i| self.functions.get(i))
    }
}

/// Every package seen in a run, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocModel {
    pub packages: Vec<PackageModel>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl DocModel {
    /// Look a package up by name, ignoring case.
    pub fn package(&self, name: &str) -> Option<&PackageModel> {
        self.index
            .get(&name.to_lowercase())
            .and_then(|&i| self.packages.get(i))
    }

    pub(crate) fn package_mut(&mut self, name: &str) -> Option<&mut PackageModel> {
        match self.index.get(&name.to_lowercase()) {
            Some(&i) => self.packages.get_mut(i),
            None => None,
        }
    }

    /// Register `name` unless a package with the same lowercase name exists.
    /// Returns true when a new entry was created.
    pub(crate) fn register(&mut self, name: &str, canonical: String) -> bool {
        let key = name.to_lowercase();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.packages.len());
        self.packages.push(PackageModel::new(canonical));
        true
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
