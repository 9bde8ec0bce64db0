use serde::Serialize;
use std::collections::BTreeMap;

/// Line that opens and closes a frontmatter block.
pub const DELIMITER: &str = "---";

/// A single frontmatter value. Only `order` is coerced to a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    Text(String),
    Number(i64),
}

impl MetaValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            MetaValue::Number(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetaValue::Number(n) => Some(*n),
            MetaValue::Text(_) => None,
        }
    }
}

/// Frontmatter metadata of a content document.
///
/// `alias` is always present (empty when the file declares none); every other
/// key is open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Meta {
    fields: BTreeMap<String, MetaValue>,
}

impl Default for Meta {
    fn default() -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("alias".to_string(), MetaValue::Text(String::new()));
        Self { fields }
    }
}

impl Meta {
    pub fn alias(&self) -> &str {
        self.get("alias").and_then(MetaValue::as_str).unwrap_or("")
    }

    pub fn order(&self) -> Option<i64> {
        self.get("order").and_then(MetaValue::as_i64)
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(MetaValue::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue) {
        self.fields.insert(key.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A parsed markdown file: frontmatter plus the remaining body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentDocument {
    pub meta: Meta,
    #[serde(rename = "content")]
    pub body: String,
}

impl ContentDocument {
    /// Text of the first level-one heading in the body, if any.
    pub fn first_heading(&self) -> Option<&str> {
        self.body.lines().find_map(|line| {
            let rest = line.strip_prefix('#')?;
            if !rest.starts_with(char::is_whitespace) {
                return None;
            }
            let text = rest.trim();
            (!text.is_empty()).then_some(text)
        })
    }
}

/// Split raw file text into frontmatter metadata and body.
///
/// Never fails: lines without both a key and a value are skipped, and text
/// without a complete delimited block is returned whole as the body.
pub fn parse(text: &str) -> ContentDocument {
    let Some((frontmatter, body)) = split_frontmatter(text) else {
        return ContentDocument {
            meta: Meta::default(),
            body: text.to_string(),
        };
    };

    let mut meta = Meta::default();
    for line in frontmatter.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            continue;
        }

        if key == "order" {
            match parse_leading_int(value) {
                Some(order) => meta.insert(key, MetaValue::Number(order)),
                None => log::debug!("ignoring non-numeric order {value:?}"),
            }
        } else {
            meta.insert(key, MetaValue::Text(value.to_string()));
        }
    }

    ContentDocument {
        meta,
        body: body.trim().to_string(),
    }
}

/// Returns `(frontmatter, body)` when the text opens with a delimiter line and
/// a closing delimiter line follows.
fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let first_line_end = text.find('\n')?;
    if text[..first_line_end].trim_end() != DELIMITER {
        return None;
    }

    let inner_start = first_line_end + 1;
    let mut offset = inner_start;
    for line in text[inner_start..].split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            return Some((&text[inner_start..offset], &text[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Integer prefix parse in the manner of `parseInt(value, 10)`.
fn parse_leading_int(value: &str) -> Option<i64> {
    let (sign, digits) = match value.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, value.strip_prefix('+').unwrap_or(value)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn extracts_pairs_and_trims_body() {
        let doc = parse("---\nalias: greetings\norder: 2\ntitle: Hello\n---\n\n# Hi\nHello / HH\n\n");

        assert_eq!(doc.meta.alias(), "greetings");
        assert_eq!(doc.meta.order(), Some(2));
        assert_eq!(doc.meta.title(), Some("Hello"));
        assert_eq!(doc.meta.len(), 3);
        assert_eq!(doc.body, "# Hi\nHello / HH");
    }

    #[test]
    fn no_frontmatter_keeps_whole_text() {
        let text = "# Title\n\nBody\n";
        let doc = parse(text);

        assert_eq!(doc.body, text);
        assert_eq!(doc.meta, Meta::default());
        assert_eq!(doc.meta.alias(), "");
    }

    #[test]
    fn unterminated_frontmatter_is_body() {
        let text = "---\nalias: broken\nno closing line";
        let doc = parse(text);

        assert_eq!(doc.body, text);
        assert_eq!(doc.meta.alias(), "");
    }

    #[test]
    fn value_keeps_text_after_first_colon() {
        let doc = parse("---\ntitle: Time: 10:30\n---\nbody");
        assert_eq!(doc.meta.title(), Some("Time: 10:30"));
    }

    #[rstest]
    #[case("no colon here")]
    #[case(": value without key")]
    #[case("key_without_value:")]
    #[case("   ")]
    fn malformed_lines_are_skipped(#[case] line: &str) {
        let doc = parse(&format!("---\nalias: a\n{line}\n---\nbody"));
        assert_eq!(doc.meta.len(), 1);
        assert_eq!(doc.meta.alias(), "a");
    }

    #[rstest]
    #[case("7", Some(7))]
    #[case("12th", Some(12))]
    #[case("-3", Some(-3))]
    #[case("first", None)]
    fn order_is_coerced_to_integer(#[case] raw: &str, #[case] expected: Option<i64>) {
        let doc = parse(&format!("---\norder: {raw}\n---\n"));
        assert_eq!(doc.meta.order(), expected);
    }

    #[test]
    fn crlf_delimiters_are_recognised() {
        let doc = parse("---\r\nalias: win\r\n---\r\nBody\r\n");
        assert_eq!(doc.meta.alias(), "win");
        assert_eq!(doc.body, "Body");
    }

    #[test]
    fn first_heading_requires_space_after_hash() {
        let doc = parse("#hashtag\n## Sub\n# Lesson One\n");
        assert_eq!(doc.first_heading(), Some("Lesson One"));
    }
}
