// ABOUTME: CSS selector plumbing shared by the category extraction rules.
// ABOUTME: Includes the compiled selector cache and document-order collection helpers.

//! Selector extraction module.
//!
//! Submodules:
//! - `compiled`: process-wide cache of parsed selectors.
//! - `select`: text, attribute and markup collection helpers.

pub mod compiled;
pub mod select;
