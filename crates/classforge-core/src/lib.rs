#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Shared vocabulary for classforge.
//!
//! This crate contains:
//! - Access-flag constants and the per-element modifier masks
//! - Modifier contributors and their resolution into flag sets
//! - Java identifier, keyword and type-name validation
//! - The JSON type manifest describing existing runtime types

pub mod manifest;
pub mod modifier;
pub mod utils;


pub use manifest::{RawAnnotation, RawField, RawMethod, RawType, parse_manifest};
pub use modifier::{
    FieldManifestation, MethodManifestation, Modifier, ModifierError, ModifierGroup,
    ModifierReviewable, Ownership, SyncState, SyntheticState, TypeManifestation, Visibility,
    resolve_modifiers,
};
