use std::collections::HashMap;

use super::{AccessFlags, MAGIC};

const MAJOR_VERSION: u16 = 52;
const OBJECT: &str = "java.lang.Object";

struct MethodSpec {
    access: u16,
    name: String,
    annotations: Vec<String>,
}

struct AnnotationSpec {
    type_name: String,
    class_values: Vec<String>,
    array_nesting: usize,
}

/// Writes minimal, well-formed compiled descriptors.
///
/// Only the structure the parser reads is emitted (no bytecode), which is
/// enough to synthesize modules for discovery fixtures.
pub struct ClassFileBuilder {
    name: String,
    super_name: Option<String>,
    access: u16,
    fields: Vec<String>,
    methods: Vec<MethodSpec>,
    type_annotations: Vec<AnnotationSpec>,
    long_constants: Vec<i64>,
}

impl ClassFileBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_name: Some(OBJECT.to_string()),
            access: AccessFlags::PUBLIC | AccessFlags::SUPER,
            fields: Vec::new(),
            methods: Vec::new(),
            type_annotations: Vec::new(),
            long_constants: Vec::new(),
        }
    }

    pub fn superclass(mut self, name: impl Into<String>) -> Self {
        self.super_name = Some(name.into());
        self
    }

    pub fn no_superclass(mut self) -> Self {
        self.super_name = None;
        self
    }

    pub fn access(mut self, access: u16) -> Self {
        self.access = access;
        self
    }

    pub fn abstract_type(mut self) -> Self {
        self.access |= AccessFlags::ABSTRACT;
        self
    }

    pub fn interface_type(mut self) -> Self {
        self.access = AccessFlags::PUBLIC | AccessFlags::INTERFACE | AccessFlags::ABSTRACT;
        self
    }

    pub fn enum_type(mut self) -> Self {
        self.access |= AccessFlags::ENUM | AccessFlags::FINAL;
        self
    }

    pub fn package_private(mut self) -> Self {
        self.access &= !AccessFlags::PUBLIC;
        self
    }

    pub fn constructor(mut self, access: u16) -> Self {
        self.methods.push(MethodSpec {
            access,
            name: "<init>".to_string(),
            annotations: Vec::new(),
        });
        self
    }

    pub fn public_constructor(self) -> Self {
        self.constructor(AccessFlags::PUBLIC)
    }

    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.methods.push(MethodSpec {
            access: AccessFlags::PUBLIC,
            name: name.into(),
            annotations: Vec::new(),
        });
        self
    }

    pub fn annotated_method(mut self, name: impl Into<String>, annotation: impl Into<String>) -> Self {
        self.methods.push(MethodSpec {
            access: AccessFlags::PUBLIC,
            name: name.into(),
            annotations: vec![annotation.into()],
        });
        self
    }

    pub fn type_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.type_annotations.push(AnnotationSpec {
            type_name: annotation.into(),
            class_values: Vec::new(),
            array_nesting: 0,
        });
        self
    }

    /// Type annotation whose `value` element is `depth` arrays, each holding
    /// the next, around an empty innermost array.
    pub fn type_annotation_with_nested_arrays(
        mut self,
        annotation: impl Into<String>,
        depth: usize,
    ) -> Self {
        self.type_annotations.push(AnnotationSpec {
            type_name: annotation.into(),
            class_values: Vec::new(),
            array_nesting: depth,
        });
        self
    }

    /// Type annotation carrying a `value` element with an array of class literals.
    pub fn type_annotation_with_classes(
        mut self,
        annotation: impl Into<String>,
        classes: &[&str],
    ) -> Self {
        self.type_annotations.push(AnnotationSpec {
            type_name: annotation.into(),
            class_values: classes.iter().map(|c| c.to_string()).collect(),
            array_nesting: 0,
        });
        self
    }

    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(name.into());
        self
    }

    pub fn long_constant(mut self, value: i64) -> Self {
        self.long_constants.push(value);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut pool = PoolWriter::default();

        for value in &self.long_constants {
            pool.long(*value);
        }
        let this_class = pool.class(&self.name);
        let super_class = self.super_name.as_deref().map(|s| pool.class(s)).unwrap_or(0);

        let int_desc = pool.utf8("I");
        let void_desc = pool.utf8("()V");
        let fields: Vec<u16> = self.fields.iter().map(|f| pool.utf8(f)).collect();

        let mut out = Vec::new();
        let mut body = Vec::new();

        put_u16(&mut body, self.access);
        put_u16(&mut body, this_class);
        put_u16(&mut body, super_class);
        put_u16(&mut body, 0); // interfaces

        put_u16(&mut body, fields.len() as u16);
        for name in fields {
            put_u16(&mut body, AccessFlags::PRIVATE);
            put_u16(&mut body, name);
            put_u16(&mut body, int_desc);
            put_u16(&mut body, 0);
        }

        put_u16(&mut body, self.methods.len() as u16);
        for method in &self.methods {
            let name = pool.utf8(&method.name);
            put_u16(&mut body, method.access);
            put_u16(&mut body, name);
            put_u16(&mut body, void_desc);
            let specs: Vec<AnnotationSpec> = method
                .annotations
                .iter()
                .map(|a| AnnotationSpec {
                    type_name: a.clone(),
                    class_values: Vec::new(),
                    array_nesting: 0,
                })
                .collect();
            write_annotations(&mut body, &mut pool, &specs);
        }

        write_annotations(&mut body, &mut pool, &self.type_annotations);

        put_u32(&mut out, MAGIC);
        put_u16(&mut out, 0);
        put_u16(&mut out, MAJOR_VERSION);
        pool.write(&mut out);
        out.extend_from_slice(&body);
        out
    }
}

fn write_annotations(out: &mut Vec<u8>, pool: &mut PoolWriter, specs: &[AnnotationSpec]) {
    if specs.is_empty() {
        put_u16(out, 0);
        return;
    }

    let mut attr = Vec::new();
    put_u16(&mut attr, specs.len() as u16);
    for spec in specs {
        put_u16(&mut attr, pool.utf8(&descriptor_of(&spec.type_name)));
        if spec.array_nesting > 0 {
            put_u16(&mut attr, 1);
            put_u16(&mut attr, pool.utf8("value"));
            for _ in 1..spec.array_nesting {
                attr.push(b'[');
                put_u16(&mut attr, 1);
            }
            attr.push(b'[');
            put_u16(&mut attr, 0);
        } else if spec.class_values.is_empty() {
            put_u16(&mut attr, 0);
        } else {
            put_u16(&mut attr, 1);
            put_u16(&mut attr, pool.utf8("value"));
            attr.push(b'[');
            put_u16(&mut attr, spec.class_values.len() as u16);
            for class in &spec.class_values {
                attr.push(b'c');
                put_u16(&mut attr, pool.utf8(&descriptor_of(class)));
            }
        }
    }

    put_u16(out, 1);
    put_u16(out, pool.utf8("RuntimeVisibleAnnotations"));
    put_u32(out, attr.len() as u32);
    out.extend_from_slice(&attr);
}

fn descriptor_of(type_name: &str) -> String {
    format!("L{};", type_name.replace('.', "/"))
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

#[derive(Default)]
struct PoolWriter {
    bytes: Vec<u8>,
    next: u16,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
}

impl PoolWriter {
    fn reserve(&mut self, slots: u16) -> u16 {
        if self.next == 0 {
            self.next = 1;
        }
        let index = self.next;
        self.next += slots;
        index
    }

    fn utf8(&mut self, value: &str) -> u16 {
        if let Some(index) = self.utf8.get(value) {
            return *index;
        }
        let index = self.reserve(1);
        self.bytes.push(1);
        put_u16(&mut self.bytes, value.len() as u16);
        self.bytes.extend_from_slice(value.as_bytes());
        self.utf8.insert(value.to_string(), index);
        index
    }

    fn class(&mut self, dotted: &str) -> u16 {
        if let Some(index) = self.classes.get(dotted) {
            return *index;
        }
        let name = self.utf8(&dotted.replace('.', "/"));
        let index = self.reserve(1);
        self.bytes.push(7);
        put_u16(&mut self.bytes, name);
        self.classes.insert(dotted.to_string(), index);
        index
    }

    fn long(&mut self, value: i64) {
        self.reserve(2);
        self.bytes.push(5);
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    fn write(&self, out: &mut Vec<u8>) {
        put_u16(out, self.next.max(1));
        out.extend_from_slice(&self.bytes);
    }
}
