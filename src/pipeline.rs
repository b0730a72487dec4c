//! Run the whole front end over a set of files.
//!
//! Files are processed one at a time in the order given; every failure is
//! turned into a [`Warning`] and the run always produces a model.

use crate::assemble::{Assembler, MergeConflict};
use crate::error::{LexError, Warning};
use crate::lexer::tokenize;
use crate::model::{DocModel, DocRecord, EntityKind};
use crate::parser::{parse_block, ParseContext};
use crate::scanner::scan;
use crate::settings::Settings;
use crate::walk::{self, WalkOptions};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Everything a run produced.
#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub model: DocModel,
    pub warnings: Vec<Warning>,
    pub conflicts: Vec<MergeConflict>,
    pub files_scanned: usize,
    pub blocks_found: usize,
}

/// Go-style visibility: an identifier is exported when it starts with an
/// uppercase letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Records extracted from one file, tagged with the file's package.
#[derive(Debug, Default)]
pub struct FileRecords {
    pub records: Vec<(String, DocRecord)>,
    pub blocks_found: usize,
    pub warnings: Vec<Warning>,
}

/// Scan, lex and parse one file. Never fails; problems become warnings.
pub fn process_file(path: &str, text: &str) -> FileRecords {
    let mut out = FileRecords::default();

    let scanned = match scan(text, path) {
        Ok(scanned) => scanned,
        Err(e) => {
            warn!(path, error = %e, "skipping file");
            out.warnings.push(Warning::file(path, e));
            return out;
        }
    };
    out.blocks_found = scanned.blocks.len();
    if !scanned.blocks.is_empty() {
        info!("{} comments found in `{}`", scanned.blocks.len(), path);
    }

    let ctx = ParseContext {
        path,
        package: &scanned.package_name,
        exported: is_exported,
    };

    for (index, block) in scanned.blocks.iter().enumerate() {
        let tagged = match tokenize(&block.lines) {
            Ok(tagged) => tagged,
            Err(LexError::EmptyBlock) => {
                debug!(path, block = index, "empty block dropped");
                continue;
            }
            Err(e) => {
                warn!(path, block = index, error = %e, "skipping block");
                out.warnings.push(Warning::block(path, index, e));
                continue;
            }
        };

        match parse_block(&tagged, &ctx) {
            Ok(parsed) => {
                if parsed.record.kind() == EntityKind::Uncategorized {
                    out.warnings.push(Warning::block(
                        path,
                        index,
                        "block has no recognized `-- KIND` header; kept as uncategorized",
                    ));
                }
                for skipped in parsed.skipped {
                    debug!(path, block = index, "{}", skipped);
                    out.warnings.push(Warning::block(path, index, skipped));
                }
                out.records
                    .push((scanned.package_name.clone(), parsed.record));
            }
            Err(e) => {
                warn!(path, block = index, error = %e, "dropping record");
                out.warnings.push(Warning::block(path, index, e));
            }
        }
    }

    out
}

/// Process `(path, text)` pairs in order and assemble the model.
pub fn run<I>(files: I, capitalize: bool) -> Report
where
    I: IntoIterator<Item = (String, std::io::Result<String>)>,
{
    let mut report = Report::default();
    let mut assembler = Assembler::new(capitalize);

    for (path, text) in files {
        let text = match text {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path, error = %e, "failed to read file");
                report.warnings.push(Warning::file(path, format!("failed to read: {}", e)));
                continue;
            }
        };
        report.files_scanned += 1;

        let file = process_file(&path, &text);
        report.blocks_found += file.blocks_found;
        report.warnings.extend(file.warnings);
        for (package, record) in file.records {
            assembler.push(&package, record);
        }
    }

    let assembly = assembler.finish();
    report.model = assembly.model;
    report.conflicts = assembly.conflicts;
    info!(
        files = report.files_scanned,
        packages = report.model.len(),
        warnings = report.warnings.len(),
        "documentation model assembled"
    );
    report
}

/// Walk the project described by `settings` and run over every match.
pub fn run_project(settings: &Settings) -> Report {
    let root = settings.project_path.as_path();
    let options = WalkOptions::new(&settings.extensions, settings.include_tests, &settings.exclude);
    let files = walk::sources(root, &options)
        .map(|(path, text)| (display_path(root, &path), text));
    run(files, settings.capitalize_items)
}

/// Path relative to the project root, with `/` separators.
fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn file(path: &str, text: &str) -> (String, std::io::Result<String>) {
        (path.to_string(), Ok(text.to_string()))
    }

    const HANDLER: &str = r#"/***
-- FILE
@file handler.go
@desc HTTP handlers.
*/

package handler

/***
-- FUNC
@func GetAllUsers
@desc Handles GET /users.
@rec UserHandler
*/

/***
-- TYPE
@type UserHandler
@field service (UserService): Service.
*/
"#;

    #[test]
    fn exported_by_case() {
        assert!(is_exported("UserHandler"));
        assert!(!is_exported("userHandler"));
        assert!(!is_exported(""));
    }

    #[test]
    fn single_file_end_to_end() {
        let report = run(vec![file("handler/handler.go", HANDLER)], false);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert_eq!(report.blocks_found, 3);

        let pkg = report.model.package("handler").unwrap();
        assert_eq!(pkg.files[0].name, "handler.go");
        assert_eq!(pkg.files[0].path, "handler/handler.go");
        assert_eq!(pkg.functions[0].receiver_type, Some(0));
        assert_eq!(pkg.types[0].methods, vec![0]);
        assert!(pkg.types[0].exported);
    }

    #[test]
    fn unterminated_file_does_not_stop_the_run() {
        let report = run(
            vec![
                file("bad.go", "package bad\n/***\n-- FUNC\n@func F\n"),
                file("good.go", "package good\n/***\n-- VAR\n@var V\n*/\n"),
            ],
            false,
        );
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].path, "bad.go");
        assert_eq!(report.warnings[0].block, None);
        assert!(report.model.package("bad").is_none());
        assert_eq!(report.model.package("good").unwrap().variables.len(), 1);
    }

    #[test]
    fn malformed_block_skips_only_that_block() {
        let text = "package p\n/***\n-- PKG\n@dep {\n@name X\n*/\n/***\n-- VAR\n@var V\n*/\n";
        let report = run(vec![file("p.go", text)], false);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].block, Some(0));
        let pkg = report.model.package("p").unwrap();
        assert!(pkg.dependencies.is_empty());
        assert_eq!(pkg.variables.len(), 1);
    }

    #[test]
    fn missing_name_drops_record_with_warning() {
        let text = "package p\n/***\n-- TYPE\n@desc nameless\n*/\n";
        let report = run(vec![file("p.go", text)], false);
        assert!(report.model.package("p").is_none());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].message.contains("TYPE"));
    }

    #[test]
    fn unknown_tags_and_uncategorized_are_reported() {
        let text = "package p\n/***\n-- TYPE\n@type T\n@usage nope\n*/\n/***\nloose text\n*/\n";
        let report = run(vec![file("p.go", text)], false);
        let pkg = report.model.package("p").unwrap();
        assert_eq!(pkg.types.len(), 1);
        assert_eq!(pkg.uncategorized.len(), 1);
        assert_eq!(pkg.uncategorized[0].preamble, "loose text");
        let blocks: Vec<_> = report.warnings.iter().map(|w| w.block).collect();
        assert_eq!(blocks, vec![Some(0), Some(1)]);
    }

    #[test]
    fn read_errors_are_warnings() {
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let report = run(vec![("x.go".to_string(), Err(missing))], false);
        assert_eq!(report.files_scanned, 0);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.model.is_empty());
    }

    #[test]
    fn packages_across_files_merge() {
        let report = run(
            vec![
                file("a/db.go", "package db\n/***\n-- PKG\n@dep { @name MySQL @import github.com/go-sql-driver/mysql }\n*/\n"),
                file("b/db.go", "package Db\n/***\n-- PKG\n@desc Database access.\n@dep github.com/go-sql-driver/mysql\n*/\n"),
            ],
            true,
        );
        assert_eq!(report.model.len(), 1);
        let pkg = &report.model.packages[0];
        assert_eq!(pkg.name, "Db");
        assert_eq!(pkg.description, "Database access.");
        assert_eq!(pkg.dependencies.len(), 1);
        assert_eq!(pkg.dependencies[0].name, "MySQL");
    }
}
