//! Core types for the gmdsl graph schema language.
//!
//! This crate holds the pieces shared by every stage of the toolchain:
//!
//! - [`span`] - byte spans, line/column positions and the [`Spanned`](span::Spanned) wrapper
//! - [`identifier`] - dotted [`QualifiedName`](identifier::QualifiedName)s
//! - [`model`] - the immutable typed model of one parsed document

pub mod identifier;
pub mod model;
pub mod span;
