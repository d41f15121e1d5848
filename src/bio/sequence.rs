#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sequence {
    pub id: String,
    pub sequence: String,
}

impl Sequence {
    pub fn new(id: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}
