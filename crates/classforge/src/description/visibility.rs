use classforge_core::modifier::{ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC};

use super::TypeDescription;

/// Whether a member with `modifiers` declared by `declaring` may be accessed
/// from `viewer`.
///
/// Public members are visible everywhere and private ones only to their
/// declaring type. Protected members are visible to subtypes. Protected and
/// package-private members are visible within the declaring package.
pub fn is_visible(declaring: &TypeDescription, modifiers: u16, viewer: &TypeDescription) -> bool {
    if modifiers & ACC_PUBLIC != 0 {
        return true;
    }
    if modifiers & ACC_PRIVATE != 0 {
        return declaring == viewer;
    }
    if modifiers & ACC_PROTECTED != 0 && viewer.is_assignable_to(declaring) {
        return true;
    }
    declaring.is_same_package(viewer)
}
