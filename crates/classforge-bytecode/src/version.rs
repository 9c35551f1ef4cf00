use std::fmt;

/// A class-file format version (`major.minor`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassFileVersion {
    major: u16,
    minor: u16,
}

impl ClassFileVersion {
    pub const JAVA_V1: Self = Self::new(45, 3);
    pub const JAVA_V5: Self = Self::new(49, 0);
    pub const JAVA_V6: Self = Self::new(50, 0);
    pub const JAVA_V7: Self = Self::new(51, 0);
    pub const JAVA_V8: Self = Self::new(52, 0);
    pub const JAVA_V11: Self = Self::new(55, 0);
    pub const JAVA_V17: Self = Self::new(61, 0);
    pub const JAVA_V21: Self = Self::new(65, 0);

    /// Highest version the reader accepts.
    pub const LATEST: Self = Self::JAVA_V21;

    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Version emitted by the compiler of the given Java release.
    pub fn for_java(release: u16) -> Option<Self> {
        match release {
            0 => None,
            1 => Some(Self::JAVA_V1),
            _ => 44u16.checked_add(release).map(|major| Self::new(major, 0)),
        }
    }

    pub fn major(self) -> u16 {
        self.major
    }

    pub fn minor(self) -> u16 {
        self.minor
    }

    /// Interfaces may carry non-abstract methods and `invokespecial` may
    /// target interface methods.
    pub fn supports_default_methods(self) -> bool {
        self >= Self::JAVA_V8
    }

    /// `ldc` may load `CONSTANT_Class` entries.
    pub fn supports_class_constants(self) -> bool {
        self >= Self::JAVA_V5
    }
}

impl Default for ClassFileVersion {
    fn default() -> Self {
        Self::JAVA_V8
    }
}

impl fmt::Display for ClassFileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
