/// Tuning of [`crate::expansion::PlanRepExpansion`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpansionConfig {
    /// Original nodes of at least this degree are splittable when no explicit
    /// set is given.
    pub min_split_degree: usize,
    /// Run the consistency check after every mutating operation in debug
    /// builds and log what it finds.
    pub verify_edits: bool,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        ExpansionConfig {
            min_split_degree: 4,
            verify_edits: false,
        }
    }
}

impl ExpansionConfig {
    pub fn with_min_split_degree(mut self, degree: usize) -> Self {
        self.min_split_degree = degree;
        self
    }

    pub fn verified(mut self) -> Self {
        self.verify_edits = true;
        self
    }
}
