//! Infer table relations from database catalog metadata and render them as
//! Sequelize model definitions.
//!
//! The pipeline is: a [`dialect::DialectAdapter`] supplies catalog SQL, the
//! schema builder in [`introspect`] runs it through a
//! [`introspect::executor::CatalogExecutor`] into a [`schema::SchemaModel`],
//! [`relations::infer_relations`] derives the associations, and the
//! generators in [`codegen`] render the files that [`writer`] persists.

pub mod cli;
pub mod codegen;
pub mod dialect;
pub mod error;
pub mod introspect;
pub mod naming;
pub mod relations;
pub mod schema;
#[cfg(test)]
mod testutil;
pub mod typemap;
pub mod writer;
