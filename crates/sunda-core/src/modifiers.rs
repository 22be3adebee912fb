//! Source-level modifier sets.

use bitflags::bitflags;

bitflags! {
    /// Declaration modifiers as written in source.
    ///
    /// This is the source-level set, not JVM access flags; `DEFAULT` exists
    /// only on interface methods and has no class-file counterpart.
    ///
    /// The serde derives delegate to the flags internals (bitflags' `serde`
    /// feature), encoding the raw bits in compact formats.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
    pub struct Modifiers: u32 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const STATIC = 1 << 3;
        const FINAL = 1 << 4;
        const ABSTRACT = 1 << 5;
        const NATIVE = 1 << 6;
        const SYNCHRONIZED = 1 << 7;
        const TRANSIENT = 1 << 8;
        const VOLATILE = 1 << 9;
        const STRICTFP = 1 << 10;
        const DEFAULT = 1 << 11;
    }
}

impl Modifiers {
    #[must_use]
    pub fn is_static(self) -> bool {
        self.contains(Modifiers::STATIC)
    }

    #[must_use]
    pub fn is_final(self) -> bool {
        self.contains(Modifiers::FINAL)
    }

    #[must_use]
    pub fn is_public(self) -> bool {
        self.contains(Modifiers::PUBLIC)
    }

    #[must_use]
    pub fn is_abstract(self) -> bool {
        self.contains(Modifiers::ABSTRACT)
    }
}
