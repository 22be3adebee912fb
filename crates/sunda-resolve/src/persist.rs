use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use bincode::Options;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use sunda_model::{ClassArena, ClassData, SourceUnitData, TypeRef};

use crate::registry::ClassRegistry;

/// Bump whenever the durable encoding or its interpretation changes.
///
/// Version history:
/// - 1: initial format (unit table, class arena, resolver-result cache).
pub const REGISTRY_FORMAT_VERSION: u32 = 1;

/// Upper bound on an encoded image. Keeps a corrupt length prefix failing
/// in the codec instead of in the allocator.
const MAX_IMAGE_BYTES: u64 = 1 << 30;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Codec(#[from] bincode::Error),
    #[error("unsupported registry format version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
    #[error("corrupt registry image: {reason}")]
    Corrupt { reason: &'static str },
}

/// On-disk shape of a registry. Classes are a flat table and every edge is
/// an id, so the graph round-trips without any pointer fixup; the name
/// index is rebuilt on load, and the resolver chain is never part of it.
#[derive(Serialize, Deserialize)]
struct RegistryImage {
    version: u32,
    units: Vec<SourceUnitData>,
    classes: ClassArena,
    binary: Vec<(String, ClassData)>,
}

/// Byte-compatible with bincode's plain `serialize_into`, with the size cap
/// on top.
fn image_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .with_limit(MAX_IMAGE_BYTES)
}

impl ClassRegistry {
    /// Writes every registered unit and class, plus cached resolver
    /// results, to `path`. Registered resolvers themselves are not
    /// persisted; re-add them after [`ClassRegistry::load`].
    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))?;
        debug!(path = %path.display(), "saved registry");
        Ok(())
    }

    /// Reconstructs a registry saved with [`ClassRegistry::save`]. The
    /// resolver chain starts empty.
    pub fn load(path: &Path) -> Result<ClassRegistry, PersistError> {
        let file = File::open(path)?;
        let registry = ClassRegistry::read_from(BufReader::new(file))?;
        debug!(path = %path.display(), "loaded registry");
        Ok(registry)
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), PersistError> {
        let mut binary = self.binary_entries();
        binary.sort_by(|(a, _), (b, _)| a.cmp(b));
        let image = RegistryImage {
            version: REGISTRY_FORMAT_VERSION,
            units: self.units.clone(),
            classes: self.arena.clone(),
            binary,
        };
        image_options().serialize_into(&mut writer, &image)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_from<R: Read>(reader: R) -> Result<ClassRegistry, PersistError> {
        let image: RegistryImage = image_options().deserialize_from(reader)?;
        if image.version != REGISTRY_FORMAT_VERSION {
            return Err(PersistError::Version {
                found: image.version,
                expected: REGISTRY_FORMAT_VERSION,
            });
        }
        validate(&image)?;
        Ok(ClassRegistry::from_parts(
            image.units,
            image.classes,
            image.binary,
        ))
    }
}

/// A decoded image is untrusted input: every id must be in range and the
/// nesting edges must form a forest before the registry walks them.
fn validate(image: &RegistryImage) -> Result<(), PersistError> {
    let corrupt = |reason: &'static str| PersistError::Corrupt { reason };
    let class_count = image.classes.len();
    let unit_count = image.units.len();

    let check_owner = |reference: &TypeRef| {
        if reference.owner.is_some_and(|owner| owner.idx() >= unit_count) {
            return Err(corrupt("type reference bound to a missing unit"));
        }
        Ok(())
    };
    let check_member_refs = |class: &ClassData| -> Result<(), PersistError> {
        for reference in class.superclass.iter().chain(&class.interfaces) {
            check_owner(reference)?;
        }
        for field in &class.fields {
            check_owner(&field.ty)?;
        }
        for method in &class.methods {
            for reference in method.returns.iter().chain(&method.parameters) {
                check_owner(reference)?;
            }
        }
        Ok(())
    };

    for (_, class) in image.classes.iter() {
        if class.unit.is_some_and(|unit| unit.idx() >= unit_count) {
            return Err(corrupt("class bound to a missing unit"));
        }
        if class.enclosing.is_some_and(|id| id.idx() >= class_count) {
            return Err(corrupt("enclosing id out of range"));
        }
        if class.nested.iter().any(|id| id.idx() >= class_count) {
            return Err(corrupt("nested id out of range"));
        }
        check_member_refs(class)?;
    }

    for (_, data) in &image.binary {
        // resolver answers stand alone; arena ids in one are meaningless
        if !data.nested.is_empty() || data.enclosing.is_some() || data.unit.is_some() {
            return Err(corrupt("resolver cache entry carries arena ids"));
        }
        check_member_refs(data)?;
    }

    // index_class and class_fqn recurse over the nesting edges, so those
    // must form a forest rooted at the unit type lists, every child
    // agreeing with its parent about enclosure.
    let mut seen = vec![false; class_count];
    let mut stack = Vec::new();
    for unit in &image.units {
        for &top in &unit.types {
            if top.idx() >= class_count {
                return Err(corrupt("unit type id out of range"));
            }
            if image.classes[top].enclosing.is_some() {
                return Err(corrupt("top-level class has an enclosing id"));
            }
            stack.push(top);
        }
    }
    while let Some(id) = stack.pop() {
        if std::mem::replace(&mut seen[id.idx()], true) {
            return Err(corrupt("class nesting is not a forest"));
        }
        for &child in &image.classes[id].nested {
            if image.classes[child].enclosing != Some(id) {
                return Err(corrupt("nested class disagrees with its enclosing id"));
            }
            stack.push(child);
        }
    }

    Ok(())
}
