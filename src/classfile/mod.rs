//! Compiled type descriptor codec.
//!
//! Reads just enough of a class file to classify a type without loading it:
//! its name, direct superclass, access flags, constructors, and the
//! annotation types attached to the type and to its methods.
mod builder;
mod reader;

pub use builder::ClassFileBuilder;

use std::collections::BTreeSet;

use crate::error::ParserError;
use reader::ByteReader;

pub const MAGIC: u32 = 0xCAFE_BABE;

const CONSTRUCTOR_NAME: &str = "<init>";
const VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";
const INVISIBLE_ANNOTATIONS: &str = "RuntimeInvisibleAnnotations";
/// Deepest array/annotation nesting accepted inside an element value.
pub const MAX_ELEMENT_NESTING: usize = 256;

/// Type and member modifier bits as stored in compiled descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AccessFlags(pub u16);

impl AccessFlags {
    pub const PUBLIC: u16 = 0x0001;
    pub const PRIVATE: u16 = 0x0002;
    pub const PROTECTED: u16 = 0x0004;
    pub const STATIC: u16 = 0x0008;
    pub const FINAL: u16 = 0x0010;
    pub const SUPER: u16 = 0x0020;
    pub const INTERFACE: u16 = 0x0200;
    pub const ABSTRACT: u16 = 0x0400;
    pub const SYNTHETIC: u16 = 0x1000;
    pub const ANNOTATION: u16 = 0x2000;
    pub const ENUM: u16 = 0x4000;

    pub fn contains(&self, bits: u16) -> bool {
        self.0 & bits == bits
    }

    pub fn is_public(&self) -> bool {
        self.contains(Self::PUBLIC)
    }

    pub fn is_abstract(&self) -> bool {
        self.contains(Self::ABSTRACT)
    }

    pub fn is_interface(&self) -> bool {
        self.contains(Self::INTERFACE)
    }

    pub fn is_enum(&self) -> bool {
        self.contains(Self::ENUM)
    }

    pub fn is_annotation(&self) -> bool {
        self.contains(Self::ANNOTATION)
    }
}

/// The parts of a compiled type that classification needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDescriptor {
    pub name: String,
    pub super_name: Option<String>,
    pub access: AccessFlags,
    pub constructors: Vec<AccessFlags>,
    pub type_annotations: BTreeSet<String>,
    pub method_annotations: BTreeSet<String>,
}

impl ClassDescriptor {
    pub fn has_method_annotation(&self, names: &[String]) -> bool {
        names.iter().any(|n| self.method_annotations.contains(n))
    }

    pub fn has_type_annotation(&self, names: &[String]) -> bool {
        names.iter().any(|n| self.type_annotations.contains(n))
    }
}

/// Converts a dotted type name to the entry path of its descriptor.
///
/// `com.acme.FooTest` → `com/acme/FooTest.class`
pub fn entry_path(type_name: &str) -> String {
    format!("{}.class", type_name.replace('.', "/"))
}

/// Converts a descriptor entry path back to a dotted type name.
pub fn type_name_from_entry(path: &str) -> Option<String> {
    let stem = path.trim_start_matches('/').strip_suffix(".class")?;
    if stem.is_empty() {
        return None;
    }
    Some(stem.replace('/', "."))
}

/// Package portion of a dotted type name; empty for the default package.
pub fn package_of(type_name: &str) -> &str {
    type_name.rsplit_once('.').map(|(pkg, _)| pkg).unwrap_or("")
}

#[derive(Debug, Clone)]
enum Constant {
    Unusable,
    Utf8(String),
    Class(u16),
    Other,
}

struct ConstantPool(Vec<Constant>);

impl ConstantPool {
    fn read(reader: &mut ByteReader<'_>) -> Result<Self, ParserError> {
        let count = reader.u16()? as usize;
        let mut entries = Vec::with_capacity(count.max(1));
        entries.push(Constant::Unusable);

        while entries.len() < count {
            let offset = reader.offset();
            let tag = reader.u8()?;
            match tag {
                1 => {
                    let len = reader.u16()? as usize;
                    let bytes = reader.take(len)?;
                    // Modified UTF-8 only differs for NUL and supplementary
                    // characters, neither of which appear in type names.
                    entries.push(Constant::Utf8(String::from_utf8_lossy(bytes).into_owned()));
                }
                7 => entries.push(Constant::Class(reader.u16()?)),
                8 | 16 | 19 | 20 => {
                    reader.skip(2)?;
                    entries.push(Constant::Other);
                }
                15 => {
                    reader.skip(3)?;
                    entries.push(Constant::Other);
                }
                3 | 4 | 9 | 10 | 11 | 12 | 17 | 18 => {
                    reader.skip(4)?;
                    entries.push(Constant::Other);
                }
                5 | 6 => {
                    reader.skip(8)?;
                    entries.push(Constant::Other);
                    entries.push(Constant::Unusable);
                }
                _ => return Err(ParserError::UnknownConstantTag { tag, offset }),
            }
        }

        Ok(Self(entries))
    }

    fn utf8(&self, index: u16) -> Result<&str, ParserError> {
        match self.0.get(index as usize) {
            Some(Constant::Utf8(s)) => Ok(s),
            _ => Err(ParserError::bad_constant_index(index, "utf8")),
        }
    }

    fn class_name(&self, index: u16) -> Result<String, ParserError> {
        match self.0.get(index as usize) {
            Some(Constant::Class(name_index)) => Ok(self.utf8(*name_index)?.replace('/', ".")),
            _ => Err(ParserError::bad_constant_index(index, "class")),
        }
    }
}

/// Parses a compiled descriptor without resolving anything it references.
pub fn parse(bytes: &[u8]) -> Result<ClassDescriptor, ParserError> {
    let mut reader = ByteReader::new(bytes);

    let magic = reader.u32()?;
    if magic != MAGIC {
        return Err(ParserError::BadMagic { found: magic });
    }
    reader.skip(4)?; // minor, major

    let pool = ConstantPool::read(&mut reader)?;

    let access = AccessFlags(reader.u16()?);
    let name = pool.class_name(reader.u16()?)?;
    let super_index = reader.u16()?;
    let super_name = if super_index == 0 {
        None
    } else {
        Some(pool.class_name(super_index)?)
    };

    let interfaces = reader.u16()? as usize;
    reader.skip(interfaces * 2)?;

    let fields = reader.u16()?;
    for _ in 0..fields {
        reader.skip(6)?; // access, name, descriptor
        skip_attributes(&mut reader)?;
    }

    let mut constructors = Vec::new();
    let mut method_annotations = BTreeSet::new();
    let methods = reader.u16()?;
    for _ in 0..methods {
        let method_access = AccessFlags(reader.u16()?);
        let method_name = pool.utf8(reader.u16()?)?;
        if method_name == CONSTRUCTOR_NAME {
            constructors.push(method_access);
        }
        reader.skip(2)?; // descriptor
        read_annotated_attributes(&mut reader, &pool, &mut method_annotations)?;
    }

    let mut type_annotations = BTreeSet::new();
    read_annotated_attributes(&mut reader, &pool, &mut type_annotations)?;

    Ok(ClassDescriptor {
        name,
        super_name,
        access,
        constructors,
        type_annotations,
        method_annotations,
    })
}

fn skip_attributes(reader: &mut ByteReader<'_>) -> Result<(), ParserError> {
    let count = reader.u16()?;
    for _ in 0..count {
        reader.skip(2)?;
        let len = reader.u32()? as usize;
        reader.skip(len)?;
    }
    Ok(())
}

fn read_annotated_attributes(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
    out: &mut BTreeSet<String>,
) -> Result<(), ParserError> {
    let count = reader.u16()?;
    for _ in 0..count {
        let attr_name = pool.utf8(reader.u16()?)?;
        let len = reader.u32()? as usize;
        if attr_name == VISIBLE_ANNOTATIONS || attr_name == INVISIBLE_ANNOTATIONS {
            let end = reader.offset() + len;
            let annotations = reader.u16()?;
            for _ in 0..annotations {
                read_annotation(reader, pool, Some(&mut *out), 0)?;
            }
            if reader.offset() != end {
                // Trust the declared attribute length over our own walk.
                let rest = end.saturating_sub(reader.offset());
                reader.skip(rest)?;
            }
        } else {
            reader.skip(len)?;
        }
    }
    Ok(())
}

fn read_annotation(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
    out: Option<&mut BTreeSet<String>>,
    depth: usize,
) -> Result<(), ParserError> {
    let type_index = reader.u16()?;
    if let Some(out) = out {
        out.insert(annotation_type_name(pool.utf8(type_index)?));
    }
    let pairs = reader.u16()?;
    for _ in 0..pairs {
        reader.skip(2)?;
        skip_element_value(reader, pool, depth + 1)?;
    }
    Ok(())
}

/// Skips one element value. `depth` counts enclosing arrays and nested
/// annotations; past [`MAX_ELEMENT_NESTING`] the descriptor is rejected.
fn skip_element_value(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
    depth: usize,
) -> Result<(), ParserError> {
    let offset = reader.offset();
    if depth > MAX_ELEMENT_NESTING {
        return Err(ParserError::NestingTooDeep {
            offset,
            limit: MAX_ELEMENT_NESTING,
        });
    }
    let tag = reader.u8()? as char;
    match tag {
        'B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z' | 's' | 'c' => reader.skip(2),
        'e' => reader.skip(4),
        '@' => read_annotation(reader, pool, None, depth),
        '[' => {
            let values = reader.u16()?;
            for _ in 0..values {
                skip_element_value(reader, pool, depth + 1)?;
            }
            Ok(())
        }
        _ => Err(ParserError::UnknownElementTag { tag, offset }),
    }
}

/// `Lorg/junit/Test;` → `org.junit.Test`
fn annotation_type_name(descriptor: &str) -> String {
    descriptor
        .strip_prefix('L')
        .and_then(|d| d.strip_suffix(';'))
        .unwrap_or(descriptor)
        .replace('/', ".")
}
