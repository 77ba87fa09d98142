//! Core of the Plang scripting language: lexer, parser, value model and the
//! stack-machine evaluator, plus an embedding API and an opt-in prelude.

pub mod api;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod stdlib;
pub mod syntax;
pub mod values;
