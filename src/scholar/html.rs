//! A forgiving HTML tokenizer producing start-tag, end-tag and text events.
//!
//! It does not build a tree or validate nesting. Comments, doctypes and processing instructions
//! are dropped. The contents of `<script>` and `<style>` come through as a single raw text event.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use quick_xml::escape::resolve_html5_entity;
use regex::{Captures, Regex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
    },
    End {
        name: String,
    },
    Text(Cow<'a, str>),
}

impl Token<'_> {
    /// Value of attribute `key` on a start tag. Later duplicates win.
    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            Token::Start { attrs, .. } => attrs
                .iter()
                .rev()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }
}

static MARKUP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        // A quote only opens a value right after `=`; elsewhere it is an ordinary character.
        r#"(?s)<!--.*?-->|<![^>]*>|<\?[^>]*>|</(?P<end>[A-Za-z][A-Za-z0-9:-]*)[^>]*>|<(?P<start>[A-Za-z][A-Za-z0-9:-]*)(?P<attrs>(?:=\s*(?:"[^"]*"|'[^']*')|[^>])*)>"#,
    )
    .unwrap()
});
static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    // key="value", key='value', key=value or a bare key
    Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+)))?"#).unwrap()
});
static SCRIPT_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</script\s*>").unwrap());
static STYLE_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</style\s*>").unwrap());

pub struct Tokenizer<'a> {
    html: &'a str,
    pos: usize,
    /// Set while inside an element whose body is not markup.
    raw_text: Option<&'static str>,
    /// End tag owed for a self-closing start tag.
    pending_end: Option<String>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(html: &'a str) -> Self {
        Tokenizer {
            html,
            pos: 0,
            raw_text: None,
            pending_end: None,
        }
    }

    fn next_raw(&mut self, element: &'static str) -> Token<'a> {
        let end_re = if element == "script" {
            &SCRIPT_END_RE
        } else {
            &STYLE_END_RE
        };
        match end_re.find_at(self.html, self.pos) {
            Some(m) if m.start() > self.pos => {
                let text = &self.html[self.pos..m.start()];
                self.pos = m.start();
                Token::Text(Cow::Borrowed(text))
            }
            Some(m) => {
                self.pos = m.end();
                self.raw_text = None;
                Token::End {
                    name: element.to_string(),
                }
            }
            None => {
                let text = &self.html[self.pos..];
                self.pos = self.html.len();
                self.raw_text = None;
                Token::Text(Cow::Borrowed(text))
            }
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(name) = self.pending_end.take() {
            return Some(Token::End { name });
        }
        loop {
            if self.pos >= self.html.len() {
                return None;
            }
            if let Some(element) = self.raw_text {
                return Some(self.next_raw(element));
            }

            let Some(caps) = MARKUP_RE.captures_at(self.html, self.pos) else {
                let text = &self.html[self.pos..];
                self.pos = self.html.len();
                return Some(Token::Text(decode_entities(text)));
            };
            let Some(whole) = caps.get(0) else {
                return None;
            };
            if whole.start() > self.pos {
                let text = &self.html[self.pos..whole.start()];
                self.pos = whole.start();
                return Some(Token::Text(decode_entities(text)));
            }
            self.pos = whole.end();

            if let Some(name) = caps.name("end") {
                return Some(Token::End {
                    name: name.as_str().to_ascii_lowercase(),
                });
            }
            if let Some(name) = caps.name("start") {
                let name = name.as_str().to_ascii_lowercase();
                let raw_attrs = caps.name("attrs").map_or("", |m| m.as_str());
                let self_closing = raw_attrs.trim_end().ends_with('/');
                self.raw_text = match name.as_str() {
                    "script" if !self_closing => Some("script"),
                    "style" if !self_closing => Some("style"),
                    _ => None,
                };
                if self_closing {
                    self.pending_end = Some(name.clone());
                }
                return Some(Token::Start {
                    name,
                    attrs: parse_attrs(raw_attrs),
                });
            }
            // comment, doctype or processing instruction
        }
    }
}

fn parse_attrs(raw: &str) -> Vec<(String, String)> {
    ATTR_RE
        .captures_iter(raw)
        .map(|cap| {
            let key = cap[1].to_ascii_lowercase();
            let val = cap
                .get(2)
                .or_else(|| cap.get(3))
                .or_else(|| cap.get(4))
                .map_or(Cow::Borrowed(""), |m| decode_entities(m.as_str()));
            (key, val.into_owned())
        })
        .collect()
}

static CHAR_REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]+;?|#[xX][0-9a-fA-F]+;?|[^\t\n\x0C <&#;]{1,32};?)").unwrap()
});

/// Entity names browsers still accept without a trailing semicolon.
const LEGACY_ENTITIES: &[&str] = &[
    "AElig", "AMP", "Aacute", "Acirc", "Agrave", "Aring", "Atilde", "Auml", "COPY", "Ccedil",
    "ETH", "Eacute", "Ecirc", "Egrave", "Euml", "GT", "Iacute", "Icirc", "Igrave", "Iuml", "LT",
    "Ntilde", "Oacute", "Ocirc", "Ograve", "Oslash", "Otilde", "Ouml", "QUOT", "REG", "THORN",
    "Uacute", "Ucirc", "Ugrave", "Uuml", "Yacute", "aacute", "acirc", "acute", "aelig", "agrave",
    "amp", "aring", "atilde", "auml", "brvbar", "ccedil", "cedil", "cent", "copy", "curren", "deg",
    "divide", "eacute", "ecirc", "egrave", "eth", "euml", "frac12", "frac14", "frac34", "gt",
    "iacute", "icirc", "iexcl", "igrave", "iquest", "iuml", "laquo", "lt", "macr", "micro",
    "middot", "nbsp", "not", "ntilde", "oacute", "ocirc", "ograve", "ordf", "ordm", "oslash",
    "otilde", "ouml", "para", "plusmn", "pound", "quot", "raquo", "reg", "sect", "shy", "sup1",
    "sup2", "sup3", "szlig", "thorn", "times", "uacute", "ucirc", "ugrave", "uml", "uuml",
    "yacute", "yen", "yuml",
];

/// Windows-1252 characters that pages commonly emit as numeric references in 0x80..=0x9F.
const CP1252_C1: [char; 32] = [
    '\u{20AC}', '\u{81}', '\u{201A}', '\u{192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{2C6}', '\u{2030}', '\u{160}', '\u{2039}', '\u{152}', '\u{8D}', '\u{17D}', '\u{8F}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{2DC}', '\u{2122}', '\u{161}', '\u{203A}', '\u{153}', '\u{9D}', '\u{17E}', '\u{178}',
];

/// Resolve named and numeric character references one at a time. A reference that cannot be
/// resolved is left as written and does not affect its neighbours.
pub fn decode_entities(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }
    CHAR_REF_RE.replace_all(raw, |caps: &Captures<'_>| {
        let reference = &caps[1];
        match reference.strip_prefix('#') {
            Some(num) => decode_numeric(num).to_string(),
            None => decode_named(reference),
        }
    })
}

fn decode_numeric(num: &str) -> char {
    let num = num.trim_end_matches(';');
    let code = match num.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => num.parse(),
    };
    match code {
        Ok(0x0D) => '\r',
        Ok(code @ 0x80..=0x9F) => CP1252_C1[(code - 0x80) as usize],
        Ok(0) | Err(_) => char::REPLACEMENT_CHARACTER,
        Ok(code) => char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER),
    }
}

fn decode_named(reference: &str) -> String {
    let resolved = match reference.strip_suffix(';') {
        Some(name) => resolve_html5_entity(name),
        None if LEGACY_ENTITIES.contains(&reference) => resolve_html5_entity(reference),
        None => None,
    };
    if let Some(value) = resolved {
        return value.to_string();
    }
    // `&ampx` reads as `&` followed by `x`: take the longest legacy name the text starts with.
    for end in (2..reference.len()).rev() {
        if let Some(name) = reference.get(..end)
            && LEGACY_ENTITIES.contains(&name)
            && let Some(value) = resolve_html5_entity(name)
        {
            return format!("{value}{}", &reference[end..]);
        }
    }
    format!("&{reference}")
}
