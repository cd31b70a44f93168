//! A catalogue-based JSON Schema compilation and evaluation engine, supporting the
//! 2019-09 and 2020-12 drafts.
//!
//! The entry point is [`Catalogue`]: it bootstraps a draft's vocabularies and
//! metaschemas, optionally mounts application schemas from disk or memory, and hands
//! out [`SessionGuard`]s whose compiled-schema cache is torn down when the guard drops.
//! Compilation ([`compiler`]) and evaluation ([`evaluator`]) are kept separate so a
//! schema compiled once can be evaluated against many instances without recompiling.
mod catalogue;
mod compiler;
mod drafts;
mod error;
mod evaluator;
mod keyword;
mod keywords;
mod metaschema;
mod number;
mod primitive_type;
mod schema;
mod scope;
#[cfg(test)]
mod test_support;
mod vocabulary;

pub use catalogue::{Catalogue, FormatValidator, SessionGuard, SessionTag};
pub use compiler::{CompileContext, CompileOutput};
pub use drafts::Draft;
pub use error::{CatalogueError, CompileError, EvalError};
pub use evaluator::Evaluator;
pub use keyword::{EvalContext, Keyword};
pub use metaschema::Metaschema;
pub use number::{deep_eq, is_integral};
pub use primitive_type::{PrimitiveType, TypeSet};
pub use schema::{CompiledKeyword, Schema, SchemaObject};
pub use scope::Scope;
pub use vocabulary::{KeywordDef, KeywordFactory, Vocabulary};
