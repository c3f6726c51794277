use std::borrow::Cow;

use crate::consts::FITS_COMMENTARY_LEN;

/// Keywords describing the data layout. They are regenerated on write and
/// never carried over from an input header.
pub const STRUCTURAL_KEYWORDS: &[&str] = &[
    "SIMPLE", "XTENSION", "BITPIX", "EXTEND", "PCOUNT", "GCOUNT", "BZERO", "BSCALE", "BLANK",
    "CHECKSUM", "DATASUM", "END",
];

/// A FITS header value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Logical(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Undefined,
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Logical(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Logical(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// One header record.
#[derive(Clone, Debug, PartialEq)]
pub enum Card {
    /// `KEYWORD = value / comment`
    Keyed {
        keyword: String,
        value: Value,
        comment: Option<String>,
        /// Card image as read from a file. Written back verbatim until the
        /// value is replaced.
        record: Option<String>,
    },
    /// `HISTORY`, `COMMENT`, blank keyword, or any record without a value indicator.
    Commentary { keyword: String, text: String },
}

impl Card {
    /// New keyed card without a comment.
    pub fn keyed(keyword: &str, value: impl Into<Value>) -> Self {
        Card::Keyed {
            keyword: keyword.to_ascii_uppercase(),
            value: value.into(),
            comment: None,
            record: None,
        }
    }

    pub fn keyword(&self) -> &str {
        match self {
            Card::Keyed { keyword, .. } | Card::Commentary { keyword, .. } => keyword,
        }
    }

    pub fn is_structural(&self) -> bool {
        let kw = self.keyword();
        STRUCTURAL_KEYWORDS.contains(&kw) || is_naxis_keyword(kw)
    }
}

/// Ordered FITS header: metadata cards plus the append-only history log.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header {
    cards: Vec<Card>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    fn position(&self, key: &str) -> Option<usize> {
        let key = key.to_ascii_uppercase();
        self.cards
            .iter()
            .position(|c| matches!(c, Card::Keyed { keyword, .. } if *keyword == key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        let key = key.to_ascii_uppercase();
        self.cards.iter().find_map(|c| match c {
            Card::Keyed { keyword, value, .. } if *keyword == key => Some(value),
            _ => None,
        })
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Comment attached to a keyed card.
    pub fn comment(&self, key: &str) -> Option<&str> {
        let i = self.position(key)?;
        match &self.cards[i] {
            Card::Keyed { comment, .. } => comment.as_deref(),
            Card::Commentary { .. } => None,
        }
    }

    /// Set a keyword, replacing an existing card in place. A new keyword is
    /// inserted after the last keyed card so trailing commentary stays last.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let card = Card::keyed(key, value);
        match self.position(key) {
            Some(i) => self.cards[i] = card,
            None => {
                let at = self
                    .cards
                    .iter()
                    .rposition(|c| matches!(c, Card::Keyed { .. }))
                    .map_or(0, |i| i + 1);
                self.cards.insert(at, card);
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let i = self.position(key)?;
        match self.cards.remove(i) {
            Card::Keyed { value, .. } => Some(value),
            Card::Commentary { .. } => None,
        }
    }

    /// Append a HISTORY entry, wrapping long text over several cards.
    pub fn add_history(&mut self, text: &str) {
        self.add_commentary("HISTORY", text);
    }

    pub fn add_comment(&mut self, text: &str) {
        self.add_commentary("COMMENT", text);
    }

    fn add_commentary(&mut self, keyword: &str, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            self.cards.push(Card::Commentary {
                keyword: keyword.to_string(),
                text: String::new(),
            });
            return;
        }
        for chunk in chars.chunks(FITS_COMMENTARY_LEN) {
            self.cards.push(Card::Commentary {
                keyword: keyword.to_string(),
                text: chunk.iter().collect(),
            });
        }
    }

    /// HISTORY entries in the order they were added.
    pub fn history(&self) -> Vec<&str> {
        self.cards
            .iter()
            .filter_map(|c| match c {
                Card::Commentary { keyword, text } if keyword == "HISTORY" => {
                    Some(text.trim_start())
                }
                _ => None,
            })
            .collect()
    }

    /// Copy of this header without the data-layout keywords.
    pub fn without_structural(&self) -> Header {
        Header {
            cards: self
                .cards
                .iter()
                .filter(|c| !c.is_structural())
                .cloned()
                .collect(),
        }
    }
}

/// Replace every character a FITS header cannot hold with `?`.
pub fn printable_ascii(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_printable_ascii) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(
            text.chars()
                .map(|c| if is_printable_ascii(c) { c } else { '?' })
                .collect(),
        )
    }
}

fn is_printable_ascii(c: char) -> bool {
    (' '..='~').contains(&c)
}

fn is_naxis_keyword(kw: &str) -> bool {
    kw.strip_prefix("NAXIS")
        .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_digit()))
}
