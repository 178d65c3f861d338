use glob::Pattern;
use log::warn;

/// Compiled entity path filter.
///
/// An empty filter accepts everything. Otherwise a path is accepted when at
/// least one pattern matches it. Patterns that are not valid globs are
/// compared literally.
#[derive(Debug, Clone, Default)]
pub struct EntityFilter {
    patterns: Vec<PathPattern>,
}

#[derive(Debug, Clone)]
enum PathPattern {
    Glob(Pattern),
    Literal(String),
}

impl PathPattern {
    fn new(raw: &str) -> Self {
        match Pattern::new(&collapse_stars(raw)) {
            Ok(pattern) => Self::Glob(pattern),
            Err(e) => {
                warn!("Filter pattern {raw:?} is not a valid glob ({e}), matching it literally");
                Self::Literal(raw.to_string())
            }
        }
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            Self::Glob(pattern) => pattern.matches(path),
            Self::Literal(literal) => literal == path,
        }
    }
}

impl EntityFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        Self {
            patterns: patterns.iter().map(|p| PathPattern::new(p.as_ref())).collect(),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|p| p.matches(path))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Folds runs of `*` into one. `glob` only accepts `**` as a whole path
/// component, while a plain shell glob treats any run as a single `*`.
fn collapse_stars(raw: &str) -> String {
    let mut collapsed = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == '*' && collapsed.ends_with('*') {
            continue;
        }
        collapsed.push(c);
    }
    collapsed
}
