//! Table-driven cleanup of typographic Unicode in free text.

use std::borrow::Cow;

const DEFAULT_REPLACEMENTS: &[(char, &str)] = &[
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201A}', "'"),
    ('\u{201B}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{201E}', "\""),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{2015}', "-"),
    ('\u{2026}', "..."),
    ('\u{00A0}', " "),
    ('\u{2009}', " "),
    ('\u{202F}', " "),
    ('\u{200B}', ""),
    ('\u{200C}', ""),
    ('\u{200D}', ""),
    ('\u{FEFF}', ""),
];

#[derive(Debug, Clone)]
pub struct TextNormalizer {
    replacements: Vec<(char, String)>,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self {
            replacements: DEFAULT_REPLACEMENTS
                .iter()
                .map(|(c, r)| (*c, (*r).to_string()))
                .collect(),
        }
    }
}

impl TextNormalizer {
    pub fn empty() -> Self {
        Self {
            replacements: Vec::new(),
        }
    }

    /// Adds or overrides a replacement.
    pub fn with_replacement(mut self, from: char, to: impl Into<String>) -> Self {
        let to = to.into();
        match self.replacements.iter_mut().find(|(c, _)| *c == from) {
            Some(entry) => entry.1 = to,
            None => self.replacements.push((from, to)),
        }
        self
    }

    /// Returns the input untouched when nothing needs replacing.
    pub fn normalize<'a>(&self, input: &'a str) -> Cow<'a, str> {
        if !input.chars().any(|c| self.lookup(c).is_some()) {
            return Cow::Borrowed(input);
        }

        let mut out = String::with_capacity(input.len());
        for c in input.chars() {
            match self.lookup(c) {
                Some(r) => out.push_str(r),
                None => out.push(c),
            }
        }
        Cow::Owned(out)
    }

    fn lookup(&self, c: char) -> Option<&str> {
        self.replacements
            .iter()
            .find(|(from, _)| *from == c)
            .map(|(_, to)| to.as_str())
    }
}
