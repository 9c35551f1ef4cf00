//! Name validation following the Java language rules.

use unicode_xid::UnicodeXID;

/// Reserved words that can never be used as identifiers. The literals
/// `true`, `false` and `null` are included since they are equally unusable.
pub const KEYWORDS: &[&str] = &[
    "abstract",
    "assert",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "default",
    "do",
    "double",
    "else",
    "enum",
    "extends",
    "false",
    "final",
    "finally",
    "float",
    "for",
    "goto",
    "if",
    "implements",
    "import",
    "instanceof",
    "int",
    "interface",
    "long",
    "native",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "strictfp",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "true",
    "try",
    "void",
    "volatile",
    "while",
];

pub fn is_keyword(s: &str) -> bool {
    KEYWORDS.contains(&s)
}

/// Whether `c` may start a Java identifier.
pub fn is_identifier_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_xid_start()
}

/// Whether `c` may appear after the first character of a Java identifier.
pub fn is_identifier_part(c: char) -> bool {
    c == '$' || c.is_xid_continue()
}

/// Check a simple identifier: non-empty, starts with an identifier start,
/// continues with identifier parts, and is not a keyword.
///
/// # Examples
/// ```
/// use classforge_core::utils::is_valid_identifier;
/// assert!(is_valid_identifier("foo$bar"));
/// assert!(!is_valid_identifier("public"));
/// assert!(!is_valid_identifier("9lives"));
/// ```
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    is_identifier_start(first) && chars.all(is_identifier_part) && !is_keyword(s)
}

/// Check a dotted binary type name such as `java.lang.Object` or
/// `demo.Outer$Inner`. Every segment must be a valid identifier, which rules
/// out leading, trailing and doubled dots.
pub fn is_valid_type_name(s: &str) -> bool {
    !s.is_empty() && s.split('.').all(is_valid_identifier)
}

/// Check a method name: either a valid identifier or one of the two
/// internal names.
pub fn is_valid_method_name(s: &str) -> bool {
    matches!(s, "<init>" | "<clinit>") || is_valid_identifier(s)
}

/// Convert a binary name to the slash-separated internal form.
pub fn to_internal_name(binary_name: &str) -> String {
    binary_name.replace('.', "/")
}

/// Convert a slash-separated internal name to the binary form.
pub fn to_binary_name(internal_name: &str) -> String {
    internal_name.replace('/', ".")
}
