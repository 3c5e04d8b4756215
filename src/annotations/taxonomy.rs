use std::fmt;

/// Surface defect classes of the NEU steel dataset, in canonical order.
/// The position in [`DefectClass::ALL`] is the class identifier written to label files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefectClass {
    Crazing,
    Inclusion,
    Patches,
    PittedSurface,
    RolledInScale,
    Scratches,
}

impl DefectClass {
    pub const ALL: [DefectClass; 6] = [
        DefectClass::Crazing,
        DefectClass::Inclusion,
        DefectClass::Patches,
        DefectClass::PittedSurface,
        DefectClass::RolledInScale,
        DefectClass::Scratches,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DefectClass::Crazing => "crazing",
            DefectClass::Inclusion => "inclusion",
            DefectClass::Patches => "patches",
            DefectClass::PittedSurface => "pitted_surface",
            DefectClass::RolledInScale => "rolled-in_scale",
            DefectClass::Scratches => "scratches",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|class| class.as_str() == name)
    }
}

impl fmt::Display for DefectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of recognised class names.
///
/// Names missing from the taxonomy are not an error; lookups simply return `None`
/// and the caller drops the region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    names: Vec<String>,
}

impl Taxonomy {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// The six NEU steel surface defect classes.
    pub fn neu_steel() -> Self {
        Self::new(DefectClass::ALL.iter().map(DefectClass::as_str))
    }

    pub fn class_id(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn name(&self, class_id: usize) -> Option<&str> {
        self.names.get(class_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::neu_steel()
    }
}
