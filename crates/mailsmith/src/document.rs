//! Minimal HTML document used as the message body.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};
use std::path::Path;

use crate::error::Result;
use crate::text::escape_html;

/// HTML document: language, title and an ordered list of body fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lang: String,
    title: String,
    body: Vec<String>,
}

impl Document {
    /// Creates an empty English document.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            lang: "EN".to_string(),
            title: title.into(),
            body: Vec::new(),
        }
    }

    /// Document language.
    #[must_use]
    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Sets the language from a two-letter code; anything else is ignored
    /// and false returned.
    pub fn set_lang(&mut self, lang: &str) -> bool {
        let lang = lang.trim();
        if lang.chars().count() != 2 || !lang.chars().all(char::is_alphabetic) {
            return false;
        }
        self.lang = lang.to_uppercase();
        true
    }

    /// Document title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Sets the title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Appends markup to the body.
    pub fn insert(&mut self, html: impl Into<String>) {
        self.body.push(html.into());
    }

    /// Inserts markup before the existing body.
    pub fn prepend(&mut self, html: impl Into<String>) {
        self.body.insert(0, html.into());
    }

    /// Reads an HTML template and appends it with every `{{ key }}` slot
    /// replaced by the escaped parameter value. Unknown slots are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be read.
    pub fn insert_template<K, V, S>(
        &mut self,
        path: impl AsRef<Path>,
        params: &HashMap<K, V, S>,
    ) -> Result<()>
    where
        K: Borrow<str> + Hash + Eq,
        V: AsRef<str>,
        S: BuildHasher,
    {
        let template = std::fs::read_to_string(path)?;
        self.insert(fill_template(&template, params));
        Ok(())
    }

    /// Body fragments in document order.
    #[must_use]
    pub fn body(&self) -> &[String] {
        &self.body
    }

    /// Body markup.
    #[must_use]
    pub fn body_html(&self) -> String {
        self.body.join("\n")
    }

    /// Renders the full document.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html lang=\"{}\">\n<head>\n<meta charset=\"UTF-8\">\n<title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
            escape_html(&self.lang),
            escape_html(&self.title),
            self.body_html()
        )
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("")
    }
}

fn fill_template<K, V, S>(template: &str, params: &HashMap<K, V, S>) -> String
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<str>,
    S: BuildHasher,
{
    let lookup = |key: &str| params.get(key).map(|v| escape_html(v.as_ref()));

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        let end = start + 2 + len + 2;
        out.push_str(&rest[..start]);
        match lookup(rest[start + 2..end - 2].trim()) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[start..end]),
        }
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}
