use std::fmt;

/// Quote `value` as a SQL string literal.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Double-quote an identifier such as `"index"`.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Any,
}

/// A `LIKE` pattern whose literal parts are escaped with `\`.
///
/// ```
/// use locview_resolver::LikePattern;
///
/// let lyrics = LikePattern::prefix("live/musicscores/").literal("_lyrics");
/// assert_eq!(lyrics.to_string(), r"live/musicscores/%\_lyrics");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LikePattern {
    parts: Vec<Part>,
}

impl LikePattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names ending with `suffix`.
    pub fn suffix(suffix: &str) -> Self {
        Self::new().any().literal(suffix)
    }

    /// Names starting with `prefix`.
    pub fn prefix(prefix: &str) -> Self {
        Self::new().literal(prefix).any()
    }

    pub fn literal(mut self, text: &str) -> Self {
        self.parts.push(Part::Literal(text.to_string()));
        self
    }

    pub fn any(mut self) -> Self {
        if self.parts.last() != Some(&Part::Any) {
            self.parts.push(Part::Any);
        }
        self
    }

    /// `LIKE '<pattern>' ESCAPE '\'` clause body.
    pub fn to_sql(&self) -> String {
        format!("LIKE {} ESCAPE '\\'", quote_literal(&self.to_string()))
    }
}

impl fmt::Display for LikePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                Part::Any => f.write_str("%")?,
                Part::Literal(text) => {
                    for c in text.chars() {
                        if matches!(c, '%' | '_' | '\\') {
                            f.write_str("\\")?;
                        }
                        write!(f, "{c}")?;
                    }
                }
            }
        }
        Ok(())
    }
}
