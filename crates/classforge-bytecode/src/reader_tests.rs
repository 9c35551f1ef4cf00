use classforge_core::modifier::{ACC_PUBLIC, ACC_SUPER};

use crate::opcodes::RETURN;
use crate::{
    AnnotationNode, AnnotationValue, ClassFileVersion, ClassHeader, ClassReader, ClassVisitor,
    ClassWriter, Error, FieldVisitor, MethodVisitor,
};

fn simple_class(version: ClassFileVersion) -> Vec<u8> {
    let mut writer = ClassWriter::new();
    writer.visit(ClassHeader {
        version,
        access: ACC_PUBLIC | ACC_SUPER,
        name: "demo/Foo".into(),
        super_name: Some("java/lang/Object".into()),
        interfaces: vec![],
    });
    writer.to_bytes().unwrap()
}

#[test]
fn rejects_bad_magic() {
    let mut bytes = simple_class(ClassFileVersion::JAVA_V8);
    bytes[0] = 0;

    assert_eq!(
        ClassReader::new(&bytes).read(),
        Err(Error::InvalidMagic(0x00fe_babe))
    );
}

#[test]
fn rejects_truncated_image() {
    let bytes = simple_class(ClassFileVersion::JAVA_V8);

    let err = ClassReader::new(&bytes[..bytes.len() - 1]).read().unwrap_err();

    assert!(matches!(err, Error::UnexpectedEof(_)));
}

#[test]
fn rejects_future_version() {
    let bytes = simple_class(ClassFileVersion::new(99, 0));

    assert_eq!(
        ClassReader::new(&bytes).read(),
        Err(Error::UnsupportedVersion(ClassFileVersion::new(99, 0)))
    );
}

#[test]
fn skip_code_tolerates_unsupported_instructions() {
    let mut writer = ClassWriter::new();
    writer.visit(ClassHeader {
        version: ClassFileVersion::JAVA_V8,
        access: ACC_PUBLIC | ACC_SUPER,
        name: "demo/Foo".into(),
        super_name: Some("java/lang/Object".into()),
        interfaces: vec![],
    });
    let mut m = MethodVisitor::new(ACC_PUBLIC, "m", "()V", vec![]);
    // goto with its operand, outside the decoded set
    m.visit_insn(0xa7);
    m.visit_insn(0x00);
    m.visit_insn(0x00);
    m.visit_insn(RETURN);
    m.visit_maxs(0, 1);
    writer.visit_method(m.visit_end());
    let bytes = writer.to_bytes().unwrap();

    let err = ClassReader::new(&bytes).read().unwrap_err();
    assert!(matches!(err, Error::UnsupportedOpcode { opcode: 0xa7, .. }));

    let class = ClassReader::new(&bytes).skip_code().read().unwrap();
    assert_eq!(class.methods[0].name, "m");
    assert_eq!(class.methods[0].code, None);
}

#[test]
fn reads_annotation_values() {
    let mut writer = ClassWriter::new();
    writer.visit(ClassHeader {
        version: ClassFileVersion::JAVA_V8,
        access: ACC_PUBLIC | ACC_SUPER,
        name: "demo/Foo".into(),
        super_name: Some("java/lang/Object".into()),
        interfaces: vec![],
    });
    let annotation = AnnotationNode::new("Ldemo/Config;", false)
        .with_value("enabled", AnnotationValue::Boolean(true))
        .with_value("limit", AnnotationValue::Long(1 << 40))
        .with_value(
            "mode",
            AnnotationValue::Enum {
                descriptor: "Ldemo/Mode;".into(),
                name: "FAST".into(),
            },
        )
        .with_value(
            "tags",
            AnnotationValue::Array(vec![
                AnnotationValue::String("a".into()),
                AnnotationValue::Int(2),
            ]),
        );
    let mut field = FieldVisitor::new(ACC_PUBLIC, "value", "Ljava/lang/String;");
    field.visit_annotation(annotation.clone());
    writer.visit_field(field.visit_end());
    let bytes = writer.to_bytes().unwrap();

    let class = ClassReader::new(&bytes).read().unwrap();

    assert_eq!(class.field("value").unwrap().annotations, vec![annotation]);
}

#[test]
fn replays_into_writer() {
    let bytes = simple_class(ClassFileVersion::JAVA_V7);
    let class = ClassReader::new(&bytes).read().unwrap();

    let mut writer = ClassWriter::new();
    class.accept(&mut writer);

    assert_eq!(writer.to_bytes().unwrap(), bytes);
}
