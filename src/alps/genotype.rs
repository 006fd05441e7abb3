/// A genotype together with the number of generations its lineage has
/// been bred for.
///
/// Created individuals start at age 0; crossover produces
/// `max(parent ages) + 1`; mutation and survival keep the age unchanged.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgedGenotype<G> {
    inner: G,
    age: usize,
}

impl<G> AgedGenotype<G> {
    pub fn new(inner: G, age: usize) -> Self {
        Self { inner, age }
    }

    /// An individual that has just been created.
    pub fn newborn(inner: G) -> Self {
        Self::new(inner, 0)
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    pub fn age(&self) -> usize {
        self.age
    }

    pub fn into_inner(self) -> G {
        self.inner
    }

    pub fn into_parts(self) -> (G, usize) {
        (self.inner, self.age)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newborn_has_age_zero() {
        let g = AgedGenotype::newborn(vec![1, 2, 3]);
        assert_eq!(g.age(), 0);
        assert_eq!(g.inner(), &vec![1, 2, 3]);
    }

    #[test]
    fn test_equal_values_distinct_ages() {
        let young = AgedGenotype::new(5u8, 0);
        let old = AgedGenotype::new(5u8, 3);

        assert_ne!(young, old);
        assert_eq!(young.inner(), old.inner());
        assert_eq!(old.into_parts(), (5, 3));
    }
}
