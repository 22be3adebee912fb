use std::fmt;

use serde::{Deserialize, Serialize};

use crate::item::ClassData;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(u32);

impl ClassId {
    #[must_use]
    pub fn from_raw(raw: u32) -> Self {
        ClassId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(u32);

impl SourceId {
    #[must_use]
    pub fn from_raw(raw: u32) -> Self {
        SourceId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({})", self.0)
    }
}

/// Flat storage for every source-declared class. Ids are allocation order
/// and stay stable for the life of the registry, which also makes the whole
/// arena serializable as a plain table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassArena {
    classes: Vec<ClassData>,
}

impl ClassArena {
    pub fn alloc(&mut self, class: ClassData) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(class);
        id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &ClassData)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(i, c)| (ClassId(i as u32), c))
    }

    pub fn get_mut(&mut self, id: ClassId) -> &mut ClassData {
        &mut self.classes[id.idx()]
    }
}

impl std::ops::Index<ClassId> for ClassArena {
    type Output = ClassData;

    fn index(&self, index: ClassId) -> &Self::Output {
        &self.classes[index.idx()]
    }
}
