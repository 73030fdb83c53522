//! # molcov Core Library
//!
//! Substructure pattern-coverage auditing for molecule datasets: given an
//! ordered list of named substructure patterns and a store of molecules and
//! molecular fragments, molcov determines which records exercise which
//! patterns and aggregates the results into a per-pattern registry.
//!
//! ## Architectural Philosophy
//!
//! The library is split into four layers with a strict dependency direction,
//! so each one stays testable on its own.
//!
//! - **[`core`]: The Foundation.** Stateless chemistry: the molecular graph
//!   (`Mol`), element tables, the SMILES reader, the SMARTS-subset pattern
//!   compiler, and the substructure matcher that enumerates tagged
//!   occurrences.
//!
//! - **[`engine`]: The Logic Core.** Chemical environments and their
//!   canonical form, the last-match-wins resolver, the record filter chain,
//!   the parallel match pipeline, and the match registry the pipeline
//!   aggregates into.
//!
//! - **[`store`]: The Persistence Boundary.** The `Store` trait the engine
//!   reads records from and hands results to, a CSV-backed implementation,
//!   and the pattern-set sources (TOML parameter sets and flat SMARTS files).
//!
//! - **[`workflows`]: The Public API.** The end-to-end query run tying the
//!   layers together: reset, fetch, match in parallel, persist, summarize.

pub mod core;
pub mod engine;
pub mod store;
pub mod workflows;
