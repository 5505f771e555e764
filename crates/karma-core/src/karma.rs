/// A single reputation change for one user.
///
/// `change` is always `1` or `-1`; a neutral mention produces no `Karma` at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Karma {
    pub user_id: String,
    pub change: i64,
}

impl Karma {
    pub fn new(user_id: impl Into<String>, change: i64) -> Self {
        Self {
            user_id: user_id.into(),
            change,
        }
    }

    /// Build a change from the text that accompanies a mention.
    /// Returns `None` unless the (already trimmed) text starts with `++` or `--`.
    pub fn from_text(user_id: impl Into<String>, text: &str) -> Option<Self> {
        let change = if text.starts_with("++") {
            1
        } else if text.starts_with("--") {
            -1
        } else {
            return None;
        };

        Some(Self::new(user_id, change))
    }
}

impl std::fmt::Display for Karma {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:+}", self.user_id, self.change)
    }
}
