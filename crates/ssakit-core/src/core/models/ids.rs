use std::fmt;

/// Dense index of a species within its [`SpeciesCatalog`](super::species::SpeciesCatalog).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpeciesId(pub usize);

/// Dense index of a reaction within its [`ReactionNetwork`](super::network::ReactionNetwork).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReactionId(pub usize);

impl SpeciesId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl ReactionId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl fmt::Display for ReactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0 + 1)
    }
}
