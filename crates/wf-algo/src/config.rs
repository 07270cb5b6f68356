/// Chunking of the state and point axes.
///
/// `None` keeps an axis in one chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlgoConfig {
    pub chunk_states: Option<usize>,
    pub chunk_points: Option<usize>,
}

impl AlgoConfig {
    pub fn with_chunk_states(mut self, n: usize) -> Self {
        self.chunk_states = Some(n);
        self
    }

    pub fn with_chunk_points(mut self, n: usize) -> Self {
        self.chunk_points = Some(n);
        self
    }
}
