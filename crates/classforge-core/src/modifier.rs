//! Access flags as they appear in the class-file format.
//!
//! Some bits are shared between element kinds (`0x0020` is `ACC_SUPER` on a
//! class and `ACC_SYNCHRONIZED` on a method), so a flag set only has meaning
//! together with the kind of element it belongs to.

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_SYNCHRONIZED: u16 = 0x0020;
pub const ACC_VOLATILE: u16 = 0x0040;
pub const ACC_BRIDGE: u16 = 0x0040;
pub const ACC_TRANSIENT: u16 = 0x0080;
pub const ACC_VARARGS: u16 = 0x0080;
pub const ACC_NATIVE: u16 = 0x0100;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_STRICT: u16 = 0x0800;
pub const ACC_SYNTHETIC: u16 = 0x1000;
pub const ACC_ANNOTATION: u16 = 0x2000;
pub const ACC_ENUM: u16 = 0x4000;

pub const EMPTY_MASK: u16 = 0;

pub const VISIBILITY_MASK: u16 = ACC_PUBLIC | ACC_PROTECTED | ACC_PRIVATE;

pub const TYPE_MODIFIER_MASK: u16 = VISIBILITY_MASK
    | ACC_STATIC
    | ACC_FINAL
    | ACC_INTERFACE
    | ACC_ABSTRACT
    | ACC_STRICT
    | ACC_SYNTHETIC
    | ACC_ANNOTATION
    | ACC_ENUM;

pub const FIELD_MODIFIER_MASK: u16 = VISIBILITY_MASK
    | ACC_STATIC
    | ACC_FINAL
    | ACC_VOLATILE
    | ACC_TRANSIENT
    | ACC_SYNTHETIC
    | ACC_ENUM;

pub const METHOD_MODIFIER_MASK: u16 = VISIBILITY_MASK
    | ACC_STATIC
    | ACC_FINAL
    | ACC_SYNCHRONIZED
    | ACC_BRIDGE
    | ACC_VARARGS
    | ACC_NATIVE
    | ACC_ABSTRACT
    | ACC_STRICT
    | ACC_SYNTHETIC;

/// Look up the flag bit for a Java modifier keyword.
///
/// Keywords sharing a bit (`volatile`/`bridge`, `transient`/`varargs`)
/// resolve to the same value.
pub fn flag_for_keyword(keyword: &str) -> Option<u16> {
    let flag = match keyword {
        "public" => ACC_PUBLIC,
        "private" => ACC_PRIVATE,
        "protected" => ACC_PROTECTED,
        "static" => ACC_STATIC,
        "final" => ACC_FINAL,
        "synchronized" => ACC_SYNCHRONIZED,
        "volatile" => ACC_VOLATILE,
        "bridge" => ACC_BRIDGE,
        "transient" => ACC_TRANSIENT,
        "varargs" => ACC_VARARGS,
        "native" => ACC_NATIVE,
        "interface" => ACC_INTERFACE,
        "abstract" => ACC_ABSTRACT,
        "strictfp" | "strict" => ACC_STRICT,
        "synthetic" => ACC_SYNTHETIC,
        "annotation" => ACC_ANNOTATION,
        "enum" => ACC_ENUM,
        _ => return None,
    };
    Some(flag)
}

/// Read access to an element's flag set.
pub trait ModifierReviewable {
    fn modifiers(&self) -> u16;

    fn is_public(&self) -> bool {
        self.modifiers() & ACC_PUBLIC != 0
    }

    fn is_protected(&self) -> bool {
        self.modifiers() & ACC_PROTECTED != 0
    }

    fn is_private(&self) -> bool {
        self.modifiers() & ACC_PRIVATE != 0
    }

    fn is_package_private(&self) -> bool {
        self.modifiers() & VISIBILITY_MASK == 0
    }

    fn is_static(&self) -> bool {
        self.modifiers() & ACC_STATIC != 0
    }

    fn is_final(&self) -> bool {
        self.modifiers() & ACC_FINAL != 0
    }

    fn is_abstract(&self) -> bool {
        self.modifiers() & ACC_ABSTRACT != 0
    }

    fn is_native(&self) -> bool {
        self.modifiers() & ACC_NATIVE != 0
    }

    fn is_synthetic(&self) -> bool {
        self.modifiers() & ACC_SYNTHETIC != 0
    }
}

/// The group a contributor belongs to. A flag set takes at most one
/// contributor from each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierGroup {
    Visibility,
    Ownership,
    TypeManifestation,
    FieldManifestation,
    MethodManifestation,
    Synchronization,
    Synthetic,
}

impl std::fmt::Display for ModifierGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Visibility => "visibility",
            Self::Ownership => "ownership",
            Self::TypeManifestation => "type manifestation",
            Self::FieldManifestation => "field manifestation",
            Self::MethodManifestation => "method manifestation",
            Self::Synchronization => "synchronization",
            Self::Synthetic => "synthetic state",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    PackagePrivate,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ownership {
    Member,
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeManifestation {
    Plain,
    Final,
    Abstract,
    Interface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldManifestation {
    Plain,
    Final,
    Volatile,
    Transient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodManifestation {
    Plain,
    Final,
    Abstract,
    Native,
    FinalNative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncState {
    Plain,
    Synchronized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntheticState {
    Plain,
    Synthetic,
}

/// A single contribution to a flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Visibility(Visibility),
    Ownership(Ownership),
    Type(TypeManifestation),
    Field(FieldManifestation),
    Method(MethodManifestation),
    Sync(SyncState),
    Synthetic(SyntheticState),
}

impl Modifier {
    pub fn group(self) -> ModifierGroup {
        match self {
            Self::Visibility(_) => ModifierGroup::Visibility,
            Self::Ownership(_) => ModifierGroup::Ownership,
            Self::Type(_) => ModifierGroup::TypeManifestation,
            Self::Field(_) => ModifierGroup::FieldManifestation,
            Self::Method(_) => ModifierGroup::MethodManifestation,
            Self::Sync(_) => ModifierGroup::Synchronization,
            Self::Synthetic(_) => ModifierGroup::Synthetic,
        }
    }

    pub fn mask(self) -> u16 {
        match self {
            Self::Visibility(v) => match v {
                Visibility::Public => ACC_PUBLIC,
                Visibility::Protected => ACC_PROTECTED,
                Visibility::PackagePrivate => EMPTY_MASK,
                Visibility::Private => ACC_PRIVATE,
            },
            Self::Ownership(o) => match o {
                Ownership::Member => EMPTY_MASK,
                Ownership::Static => ACC_STATIC,
            },
            Self::Type(t) => match t {
                TypeManifestation::Plain => EMPTY_MASK,
                TypeManifestation::Final => ACC_FINAL,
                TypeManifestation::Abstract => ACC_ABSTRACT,
                TypeManifestation::Interface => ACC_INTERFACE | ACC_ABSTRACT,
            },
            Self::Field(f) => match f {
                FieldManifestation::Plain => EMPTY_MASK,
                FieldManifestation::Final => ACC_FINAL,
                FieldManifestation::Volatile => ACC_VOLATILE,
                FieldManifestation::Transient => ACC_TRANSIENT,
            },
            Self::Method(m) => match m {
                MethodManifestation::Plain => EMPTY_MASK,
                MethodManifestation::Final => ACC_FINAL,
                MethodManifestation::Abstract => ACC_ABSTRACT,
                MethodManifestation::Native => ACC_NATIVE,
                MethodManifestation::FinalNative => ACC_FINAL | ACC_NATIVE,
            },
            Self::Sync(s) => match s {
                SyncState::Plain => EMPTY_MASK,
                SyncState::Synchronized => ACC_SYNCHRONIZED,
            },
            Self::Synthetic(s) => match s {
                SyntheticState::Plain => EMPTY_MASK,
                SyntheticState::Synthetic => ACC_SYNTHETIC,
            },
        }
    }
}

macro_rules! impl_into_modifier {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for Modifier {
            fn from(value: $ty) -> Self {
                Modifier::$variant(value)
            }
        })*
    };
}

impl_into_modifier! {
    Visibility => Visibility,
    Ownership => Ownership,
    TypeManifestation => Type,
    FieldManifestation => Field,
    MethodManifestation => Method,
    SyncState => Sync,
    SyntheticState => Synthetic,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModifierError {
    #[error("more than one {0} modifier given")]
    DuplicateGroup(ModifierGroup),

    #[error("modifier {modifier:?} is not allowed here (mask {mask:#06x})")]
    OutOfMask { modifier: Modifier, mask: u16 },
}

/// Combine contributors into a flag set constrained by `mask`.
pub fn resolve_modifiers(mask: u16, contributors: &[Modifier]) -> Result<u16, ModifierError> {
    let mut seen: Vec<ModifierGroup> = Vec::with_capacity(contributors.len());
    let mut flags = EMPTY_MASK;
    for &modifier in contributors {
        let group = modifier.group();
        if seen.contains(&group) {
            return Err(ModifierError::DuplicateGroup(group));
        }
        seen.push(group);

        let bits = modifier.mask();
        if bits & !mask != 0 {
            return Err(ModifierError::OutOfMask { modifier, mask });
        }
        flags |= bits;
    }
    Ok(flags)
}
