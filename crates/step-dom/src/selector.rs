//! Tag-plus-attribute selectors.

/// A single attribute condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeMatch {
    /// `[name]`: attribute present, any value.
    Present(String),
    /// `[name="value"]`: attribute present with exactly this value.
    Equals(String, String),
}

impl AttributeMatch {
    fn matches(&self, lookup: &dyn Fn(&str) -> Option<String>) -> bool {
        match self {
            Self::Present(name) => lookup(name).is_some(),
            Self::Equals(name, value) => lookup(name).as_deref() == Some(value.as_str()),
        }
    }
}

/// Selector of the form `tag[attr][attr="value"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tag: String,
    attributes: Vec<AttributeMatch>,
}

impl Selector {
    /// Match elements by tag name (ASCII case-insensitive).
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: Vec::new(),
        }
    }

    /// Require an attribute to be present.
    pub fn with_attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(AttributeMatch::Present(name.into()));
        self
    }

    /// Require an attribute to have an exact value.
    pub fn with_attribute_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .push(AttributeMatch::Equals(name.into(), value.into()));
        self
    }

    /// Tag name this selector matches.
    pub fn tag_name(&self) -> &str {
        &self.tag
    }

    /// Check an element given its tag and an attribute lookup.
    pub fn matches(&self, tag: &str, lookup: &dyn Fn(&str) -> Option<String>) -> bool {
        tag.eq_ignore_ascii_case(&self.tag) && self.attributes.iter().all(|a| a.matches(lookup))
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag)?;
        for attribute in &self.attributes {
            match attribute {
                AttributeMatch::Present(name) => write!(f, "[{}]", name)?,
                AttributeMatch::Equals(name, value) => {
                    write!(f, "[{}=\"{}\"]", name, value.replace('"', "\\\""))?
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(attrs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            attrs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_display() {
        let selector = Selector::tag("mk").with_attribute("img").with_attribute("src");
        assert_eq!(selector.to_string(), "mk[img][src]");

        let script = Selector::tag("script").with_attribute_value("src", "https://x/y.js");
        assert_eq!(script.to_string(), r#"script[src="https://x/y.js"]"#);
    }

    #[test]
    fn test_requires_all_attributes() {
        let selector = Selector::tag("mk").with_attribute("img").with_attribute("src");
        let both = [("img", ""), ("src", "a.png")];
        let only_src = [("src", "a.png")];

        assert!(selector.matches("mk", &lookup(&both)));
        assert!(selector.matches("MK", &lookup(&both)));
        assert!(!selector.matches("mk", &lookup(&only_src)));
        assert!(!selector.matches("div", &lookup(&both)));
    }

    #[test]
    fn test_exact_value() {
        let selector = Selector::tag("script").with_attribute_value("src", "/a.js");
        assert!(selector.matches("script", &lookup(&[("src", "/a.js")])));
        assert!(!selector.matches("script", &lookup(&[("src", "/a.js?v=2")])));
    }
}
