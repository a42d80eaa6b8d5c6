//! Locale cascade collaborator

/// Supplies the configured locales and the active one
///
/// Only consulted to pick the matcher family at start-up and to stamp a
/// matched route with its implied locale.
pub trait LocaleCascade {
    /// Locale ids in cascade order; the first is the primary locale
    fn locales(&self) -> &[String];

    /// Locale active for the current request
    fn current_locale(&self) -> &str;

    fn is_multi_locale(&self) -> bool {
        self.locales().len() > 1
    }
}

/// Fixed locale list with a selectable current locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticLocales {
    locales: Vec<String>,
    current: usize,
}

impl StaticLocales {
    /// An empty list falls back to `en`
    pub fn new<I, S>(locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut locales: Vec<String> = locales.into_iter().map(Into::into).collect();
        if locales.is_empty() {
            locales.push("en".to_string());
        }
        Self { locales, current: 0 }
    }

    /// Select the current locale; unknown ids leave it unchanged
    pub fn with_current(mut self, id: &str) -> Self {
        if let Some(i) = self.locales.iter().position(|l| l == id) {
            self.current = i;
        }
        self
    }

    pub fn primary(&self) -> &str {
        &self.locales[0]
    }
}

impl LocaleCascade for StaticLocales {
    fn locales(&self) -> &[String] {
        &self.locales
    }

    fn current_locale(&self) -> &str {
        &self.locales[self.current]
    }
}
