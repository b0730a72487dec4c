//! Tag parser — builds a typed record from a lexed block.
//!
//! Each entity kind owns a static table mapping tag names to a setter or
//! accumulator on its record. A tag missing from the table is the single
//! rejection path: it is reported in [`Parsed::skipped`] and ignored.

pub mod values;

use crate::error::ParseError;
use crate::model::*;
use std::path::Path;

/// Per-block inputs the record cannot derive from its tags.
#[derive(Clone, Copy)]
pub struct ParseContext<'a> {
    pub path: &'a str,
    /// Package declared by the scanned file.
    pub package: &'a str,
    /// Decides the exported flag from an identifier.
    pub exported: fn(&str) -> bool,
}

/// A record plus the tags that were skipped while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub record: DocRecord,
    pub skipped: Vec<ParseError>,
}

/// Parse a lexed block, carrying its preamble into uncategorized records.
pub fn parse_block(block: &TagBlock, ctx: &ParseContext) -> Result<Parsed, ParseError> {
    let mut parsed = parse(block.kind, &block.directives, ctx)?;
    if let DocRecord::Uncategorized(ref mut doc) = parsed.record {
        doc.preamble = block.preamble.clone();
    }
    Ok(parsed)
}

/// Build the record for `kind` from its directives.
pub fn parse(
    kind: EntityKind,
    directives: &[Directive],
    ctx: &ParseContext,
) -> Result<Parsed, ParseError> {
    let mut skipped = Vec::new();

    let record = match kind {
        EntityKind::File => {
            let mut doc = FileDoc {
                path: ctx.path.to_string(),
                ..Default::default()
            };
            FILE_TAGS.apply(&mut doc, directives, &mut skipped);
            if doc.name.is_empty() {
                doc.name = file_name(ctx.path);
            }
            DocRecord::File(doc)
        }
        EntityKind::Package => {
            let mut doc = PackageDoc::default();
            PACKAGE_TAGS.apply(&mut doc, directives, &mut skipped);
            if doc.name.is_empty() {
                doc.name = ctx.package.to_string();
            }
            DocRecord::Package(doc)
        }
        EntityKind::Type => {
            let mut doc = TypeDoc::default();
            TYPE_TAGS.apply(&mut doc, directives, &mut skipped);
            require_name(kind, &doc.name, "type")?;
            doc.exported = (ctx.exported)(&doc.name);
            DocRecord::Type(doc)
        }
        EntityKind::Variable => {
            let mut doc = VariableDoc::default();
            VARIABLE_TAGS.apply(&mut doc, directives, &mut skipped);
            require_name(kind, &doc.name, "var")?;
            doc.exported = (ctx.exported)(&doc.name);
            DocRecord::Variable(doc)
        }
        EntityKind::Function => {
            let mut doc = FunctionDoc::default();
            FUNCTION_TAGS.apply(&mut doc, directives, &mut skipped);
            require_name(kind, &doc.name, "func")?;
            doc.exported = (ctx.exported)(&doc.name);
            DocRecord::Function(doc)
        }
        EntityKind::Uncategorized => DocRecord::Uncategorized(UncategorizedDoc {
            path: ctx.path.to_string(),
            preamble: String::new(),
            directives: directives.to_vec(),
        }),
    };

    Ok(Parsed { record, skipped })
}

fn require_name(kind: EntityKind, name: &str, tag: &'static str) -> Result<(), ParseError> {
    if name.is_empty() {
        return Err(ParseError::MissingRequiredTag { kind, tag });
    }
    Ok(())
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

// -- Tag tables ---------------------------------------------------------------

type Setter<T> = fn(&mut T, &Directive, &mut Vec<ParseError>);

struct TagTable<T: 'static> {
    kind: EntityKind,
    entries: &'static [(&'static str, Setter<T>)],
}

impl<T: 'static> TagTable<T> {
    fn lookup(&self, name: &str) -> Option<Setter<T>> {
        self.entries
            .iter()
            .find(|(tag, _)| *tag == name)
            .map(|&(_, set)| set)
    }

    fn apply(&self, target: &mut T, directives: &[Directive], skipped: &mut Vec<ParseError>) {
        for directive in directives {
            match self.lookup(&directive.name) {
                Some(set) => set(target, directive, skipped),
                None => skipped.push(ParseError::UnknownTag {
                    kind: self.kind,
                    tag: directive.name.clone(),
                }),
            }
        }
    }
}

fn invalid(skipped: &mut Vec<ParseError>, d: &Directive, message: String) {
    skipped.push(ParseError::InvalidValue {
        tag: d.name.clone(),
        message,
    });
}

static FILE_TAGS: TagTable<FileDoc> = TagTable {
    kind: EntityKind::File,
    entries: &[
        ("file", |doc, d, _| doc.name = d.value.clone()),
        ("desc", |doc, d, _| doc.description = d.value.clone()),
        ("auth", |doc, d, _| doc.author = d.value.clone()),
        ("author", |doc, d, _| doc.author = d.value.clone()),
        ("v", |doc, d, _| doc.version = d.value.clone()),
        ("version", |doc, d, _| doc.version = d.value.clone()),
        ("date", |doc, d, _| doc.date = d.value.clone()),
    ],
};

static PACKAGE_TAGS: TagTable<PackageDoc> = TagTable {
    kind: EntityKind::Package,
    entries: &[
        ("pkg", |doc, d, _| doc.name = d.value.clone()),
        ("desc", |doc, d, _| doc.description = d.value.clone()),
        ("usage", |doc, d, _| doc.usage = d.value.clone()),
        ("dep", |doc, d, skipped| {
            if d.is_block() {
                let mut dep = DependencyDoc::default();
                DEPENDENCY_TAGS.apply(&mut dep, &d.children, skipped);
                if dep.description.is_empty() {
                    dep.description = d.value.clone();
                }
                doc.dependencies.push(dep);
            } else if !d.value.is_empty() {
                doc.dependencies.push(values::bare_dependency(&d.value));
            } else {
                invalid(skipped, d, "empty dependency".to_string());
            }
        }),
    ],
};

static DEPENDENCY_TAGS: TagTable<DependencyDoc> = TagTable {
    kind: EntityKind::Package,
    entries: &[
        ("name", |dep, d, _| dep.name = d.value.clone()),
        ("n", |dep, d, _| dep.name = d.value.clone()),
        ("desc", |dep, d, _| dep.description = d.value.clone()),
        ("link", |dep, d, _| dep.link = d.value.clone()),
        ("import", |dep, d, _| dep.import_path = d.value.clone()),
    ],
};

static TYPE_TAGS: TagTable<TypeDoc> = TagTable {
    kind: EntityKind::Type,
    entries: &[
        ("type", |doc, d, _| doc.name = d.value.clone()),
        ("desc", |doc, d, _| doc.description = d.value.clone()),
        ("field", |doc, d, skipped| match values::typed_name(&d.value) {
            Ok(field) => doc.fields.push(field),
            Err(message) => invalid(skipped, d, message),
        }),
    ],
};

static VARIABLE_TAGS: TagTable<VariableDoc> = TagTable {
    kind: EntityKind::Variable,
    entries: &[
        ("var", |doc, d, _| doc.name = d.value.clone()),
        ("type", |doc, d, _| doc.ty = d.value.clone()),
        ("desc", |doc, d, _| doc.description = d.value.clone()),
    ],
};

static FUNCTION_TAGS: TagTable<FunctionDoc> = TagTable {
    kind: EntityKind::Function,
    entries: &[
        ("func", |doc, d, _| {
            let (name, receiver) = values::function_signature(&d.value);
            doc.name = name;
            if doc.receiver.is_none() {
                doc.receiver = receiver;
            }
        }),
        ("desc", |doc, d, _| doc.description = d.value.clone()),
        ("param", |doc, d, skipped| match values::typed_name(&d.value) {
            Ok(param) => doc.params.push(param),
            Err(message) => invalid(skipped, d, message),
        }),
        ("return", |doc, d, _| doc.returns.push(values::return_value(&d.value))),
        ("res", |doc, d, skipped| match values::response(&d.value) {
            Ok(res) => doc.responses.push(res),
            Err(message) => invalid(skipped, d, message),
        }),
        ("rec", |doc, d, skipped| {
            let receiver = values::receiver(&d.value);
            if receiver.is_empty() {
                invalid(skipped, d, "missing receiver type".to_string());
            } else {
                doc.receiver = Some(receiver);
            }
        }),
        ("ex", |doc, d, skipped| {
            if d.is_block() {
                let mut example = ExampleDoc::default();
                EXAMPLE_TAGS.apply(&mut example, &d.children, skipped);
                if example.description.is_empty() {
                    example.description = d.value.clone();
                }
                doc.examples.push(example);
            } else if !d.value.is_empty() {
                doc.examples.push(values::inline_example(&d.value));
            } else {
                invalid(skipped, d, "empty example".to_string());
            }
        }),
    ],
};

static EXAMPLE_TAGS: TagTable<ExampleDoc> = TagTable {
    kind: EntityKind::Function,
    entries: &[
        ("code", |ex, d, _| ex.code = d.value.clone()),
        ("desc", |ex, d, _| ex.description = d.value.clone()),
    ],
};
