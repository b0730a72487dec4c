//! Model assembly: fold per-block records into one entry per package.
//!
//! Package names collapse case-insensitively. The first spelling seen wins
//! (optionally title-cased), and receiver links are resolved only after
//! every record is in, so a method may be documented before its type.

use crate::model::*;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Two non-empty values for a single-valued package field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeConflict {
    pub package: String,
    pub field: &'static str,
    pub kept: String,
    pub discarded: String,
}

/// Output of [`assemble`].
#[derive(Debug, Default)]
pub struct Assembly {
    pub model: DocModel,
    pub conflicts: Vec<MergeConflict>,
}

/// Fold `(package name, record)` pairs, in file-walk order, into a model.
pub fn assemble<I>(records: I, capitalize: bool) -> Assembly
where
    I: IntoIterator<Item = (String, DocRecord)>,
{
    let mut assembler = Assembler::new(capitalize);
    for (package, record) in records {
        assembler.push(&package, record);
    }
    assembler.finish()
}

/// Builds the model one record at a time as files are walked.
pub struct Assembler {
    capitalize: bool,
    model: DocModel,
    conflicts: Vec<MergeConflict>,
}

impl Assembler {
    pub fn new(capitalize: bool) -> Self {
        Assembler {
            capitalize,
            model: DocModel::default(),
            conflicts: Vec::new(),
        }
    }

    /// Register `package` on first sight, then fold `record` into it.
    pub fn push(&mut self, package: &str, record: DocRecord) {
        self.register(package);
        self.fold(package, record);
    }

    /// Resolve receiver links now that every type is known.
    pub fn finish(mut self) -> Assembly {
        self.link_receivers();
        Assembly {
            model: self.model,
            conflicts: self.conflicts,
        }
    }

    fn register(&mut self, name: &str) {
        let canonical = if self.capitalize {
            capitalize_first(name)
        } else {
            name.to_string()
        };
        if self.model.register(name, canonical) {
            debug!(package = name, "registered package");
        }
    }

    fn fold(&mut self, package: &str, record: DocRecord) {
        // `push` registers before folding.
        let Some(pkg) = self.model.package_mut(package) else {
            return;
        };

        match record {
            DocRecord::File(file) => pkg.files.push(file),
            DocRecord::Package(doc) => {
                if !doc.name.eq_ignore_ascii_case(package) {
                    debug!(declared = %doc.name, package, "@pkg differs from package clause");
                }
                merge_package(pkg, doc, &mut self.conflicts);
            }
            DocRecord::Type(ty) => pkg.types.push(ty),
            DocRecord::Variable(var) => pkg.variables.push(var),
            DocRecord::Function(func) => pkg.functions.push(func),
            DocRecord::Uncategorized(doc) => pkg.uncategorized.push(doc),
        }
    }

    /// Attach each function with a receiver to the same-named type of its
    /// package. Functions without a match stay unassociated.
    fn link_receivers(&mut self) {
        for pkg in &mut self.model.packages {
            let mut by_name: HashMap<&str, usize> = HashMap::new();
            for (i, ty) in pkg.types.iter().enumerate() {
                by_name.entry(ty.name.as_str()).or_insert(i);
            }

            let mut links = Vec::new();
            for (fi, func) in pkg.functions.iter().enumerate() {
                let Some(receiver) = func.receiver.as_deref() else {
                    continue;
                };
                match by_name.get(receiver) {
                    Some(&ti) => links.push((fi, ti)),
                    None => debug!(
                        package = %pkg.name,
                        function = %func.name,
                        receiver,
                        "receiver type not documented; function left unassociated"
                    ),
                }
            }

            for (fi, ti) in links {
                pkg.functions[fi].receiver_type = Some(ti);
                pkg.types[ti].methods.push(fi);
            }
        }
    }
}

fn merge_package(pkg: &mut PackageModel, doc: PackageDoc, conflicts: &mut Vec<MergeConflict>) {
    merge_scalar(&pkg.name, "description", &mut pkg.description, doc.description, conflicts);
    merge_scalar(&pkg.name, "usage", &mut pkg.usage, doc.usage, conflicts);

    for dep in doc.dependencies {
        let duplicate = pkg
            .dependencies
            .iter()
            .any(|existing| existing.dedup_key() == dep.dedup_key());
        if duplicate {
            debug!(package = %pkg.name, import = dep.dedup_key(), "duplicate dependency dropped");
        } else {
            pkg.dependencies.push(dep);
        }
    }
}

/// First non-empty value wins; a later different one is a conflict.
fn merge_scalar(
    package: &str,
    field: &'static str,
    slot: &mut String,
    incoming: String,
    conflicts: &mut Vec<MergeConflict>,
) {
    if incoming.is_empty() || *slot == incoming {
        return;
    }
    if slot.is_empty() {
        *slot = incoming;
        return;
    }
    warn!(package, field, "conflicting package documentation; keeping the first value");
    conflicts.push(MergeConflict {
        package: package.to_string(),
        field,
        kept: slot.clone(),
        discarded: incoming,
    });
}

fn capitalize_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn func(name: &str, receiver: Option<&str>) -> DocRecord {
        DocRecord::Function(FunctionDoc {
            name: name.to_string(),
            receiver: receiver.map(str::to_string),
            ..Default::default()
        })
    }

    fn ty(name: &str) -> DocRecord {
        DocRecord::Type(TypeDoc {
            name: name.to_string(),
            ..Default::default()
        })
    }

    fn pkg_doc(desc: &str, deps: &[(&str, &str)]) -> DocRecord {
        DocRecord::Package(PackageDoc {
            name: "db".to_string(),
            description: desc.to_string(),
            usage: String::new(),
            dependencies: deps
                .iter()
                .map(|(name, import)| DependencyDoc {
                    name: name.to_string(),
                    import_path: import.to_string(),
                    ..Default::default()
                })
                .collect(),
        })
    }

    #[test]
    fn case_variants_collapse_to_first_seen() {
        let out = assemble(
            vec![
                ("db".to_string(), ty("Conn")),
                ("Db".to_string(), ty("Pool")),
            ],
            false,
        );
        assert_eq!(out.model.len(), 1);
        let pkg = &out.model.packages[0];
        assert_eq!(pkg.name, "db");
        assert_eq!(pkg.types.len(), 2);
    }

    #[test]
    fn capitalize_uses_first_spelling() {
        let out = assemble(vec![("handler".to_string(), ty("H"))], true);
        assert_eq!(out.model.packages[0].name, "Handler");
        assert!(out.model.package("HANDLER").is_some());
    }

    #[test]
    fn receiver_links_regardless_of_order() {
        let out = assemble(
            vec![
                ("handler".to_string(), func("GetAllUsers", Some("UserHandler"))),
                ("handler".to_string(), ty("UserHandler")),
                ("handler".to_string(), func("NewUserHandler", None)),
            ],
            false,
        );
        let pkg = out.model.package("handler").unwrap();
        assert_eq!(pkg.functions[0].receiver_type, Some(0));
        assert_eq!(pkg.types[0].methods, vec![0]);
        assert_eq!(pkg.functions[1].receiver_type, None);
        let ty = pkg.type_named("UserHandler").unwrap();
        let names: Vec<_> = pkg.methods_of(ty).map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["GetAllUsers"]);
    }

    #[test]
    fn missing_receiver_type_stays_unassociated() {
        let out = assemble(vec![("a".to_string(), func("Close", Some("Ghost")))], false);
        let pkg = &out.model.packages[0];
        assert_eq!(pkg.functions[0].receiver_type, None);
        assert_eq!(pkg.functions[0].receiver.as_deref(), Some("Ghost"));
    }

    #[test]
    fn receivers_do_not_cross_packages() {
        let out = assemble(
            vec![
                ("a".to_string(), ty("T")),
                ("b".to_string(), func("M", Some("T"))),
            ],
            false,
        );
        assert_eq!(out.model.package("b").unwrap().functions[0].receiver_type, None);
        assert!(out.model.package("a").unwrap().types[0].methods.is_empty());
    }

    #[test]
    fn package_docs_merge() {
        let out = assemble(
            vec![
                ("db".to_string(), pkg_doc("", &[("mysql", "github.com/go-sql-driver/mysql")])),
                ("db".to_string(), pkg_doc("Connections.", &[("MySQL", "github.com/go-sql-driver/mysql")])),
                ("db".to_string(), pkg_doc("Other text.", &[("sqlx", "github.com/jmoiron/sqlx")])),
            ],
            false,
        );
        let pkg = &out.model.packages[0];
        assert_eq!(pkg.description, "Connections.");
        let imports: Vec<_> = pkg.dependencies.iter().map(|d| d.import_path.as_str()).collect();
        assert_eq!(
            imports,
            vec!["github.com/go-sql-driver/mysql", "github.com/jmoiron/sqlx"]
        );
        assert_eq!(pkg.dependencies[0].name, "mysql");
        assert_eq!(
            out.conflicts,
            vec![MergeConflict {
                package: "db".to_string(),
                field: "description",
                kept: "Connections.".to_string(),
                discarded: "Other text.".to_string(),
            }]
        );
    }

    #[test]
    fn packages_keep_first_seen_order() {
        let out = assemble(
            vec![
                ("main".to_string(), ty("A")),
                ("db".to_string(), ty("B")),
                ("main".to_string(), ty("C")),
            ],
            false,
        );
        let names: Vec<_> = out.model.packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["main", "db"]);
    }

    #[test]
    fn incremental_pushes_across_files() {
        let mut assembler = Assembler::new(true);
        assembler.push("handler", func("GetAllUsers", Some("UserHandler")));
        assembler.push("db", pkg_doc("Connections.", &[]));
        assembler.push("Handler", ty("UserHandler"));
        assembler.push("DB", ty("Conn"));
        let out = assembler.finish();

        let names: Vec<_> = out.model.packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Handler", "Db"]);
        let handler = out.model.package("handler").unwrap();
        assert_eq!(handler.functions[0].receiver_type, Some(0));
        assert_eq!(handler.types[0].methods, vec![0]);
        let db = out.model.package("db").unwrap();
        assert_eq!(db.description, "Connections.");
        assert_eq!(db.types.len(), 1);
    }

    #[test]
    fn empty_input_is_empty_model() {
        let out = assemble(Vec::<(String, DocRecord)>::new(), false);
        assert!(out.model.is_empty());
        assert!(out.conflicts.is_empty());
    }
}
