//! tagdoc — extract `/*** … */` tag documentation into a package model.
//!
//! The front end runs in four stages, each usable on its own:
//!
//! 1. [`scanner::scan`] — find the package clause and documentation blocks in one file
//! 2. [`lexer::tokenize`] — split a block into its header kind and `@tag` directives
//! 3. [`parser::parse`] — build a typed record from the directives
//! 4. [`assemble::assemble`] — fold records from every file into a [`model::DocModel`]
//!
//! [`pipeline::run`] chains them over a set of files and collects warnings.

pub mod assemble;
pub mod error;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod scanner;
pub mod settings;
pub mod walk;
