/// A requested change of browser location.
///
/// Gate and exchange return this instead of navigating themselves; a `Navigator`
/// applies it (the web server turns it into a `303 See Other`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub location: String,
}

impl Navigation {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }
}
