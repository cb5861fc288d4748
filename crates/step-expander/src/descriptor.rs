//! Path-list parsing.

/// Parsed path-list attribute of a step tag.
///
/// Always holds at least one path; every path is trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTagDescriptor {
    paths: Vec<String>,
}

impl StepTagDescriptor {
    /// Split `raw` on `delimiter`, trim each segment and drop empty ones.
    ///
    /// Returns `None` when no segment survives.
    pub fn parse(raw: &str, delimiter: &str) -> Option<Self> {
        let paths: Vec<String> = if delimiter.is_empty() {
            vec![raw.trim().to_string()]
        } else {
            raw.split(delimiter).map(|p| p.trim().to_string()).collect()
        };
        let paths: Vec<String> = paths.into_iter().filter(|p| !p.is_empty()).collect();

        if paths.is_empty() {
            None
        } else {
            Some(Self { paths })
        }
    }

    /// Image paths in attribute order.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Number of images.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether there are no paths. Never true for a parsed descriptor.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of arrow separators (one fewer than images).
    pub fn arrow_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Steps with their 1-based display index.
    pub fn steps(&self) -> impl Iterator<Item = StepImage<'_>> {
        let last = self.paths.len();
        self.paths.iter().enumerate().map(move |(i, path)| StepImage {
            path,
            index: i + 1,
            is_last: i + 1 == last,
        })
    }
}

/// One image in a step sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepImage<'a> {
    /// Image source.
    pub path: &'a str,
    /// 1-based position.
    pub index: usize,
    /// Whether no arrow follows this image.
    pub is_last: bool,
}

impl StepImage<'_> {
    /// Descriptive label for the image.
    pub fn alt_text(&self) -> String {
        format!("Step {}", self.index)
    }

    /// Label after the image failed to load.
    pub fn failed_alt_text(&self) -> String {
        format!("Step {} (image failed to load)", self.index)
    }
}
