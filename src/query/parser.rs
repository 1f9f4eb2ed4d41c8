//! Compact filter expressions, e.g.
//! `sun loc:US rate:0-150 stars:>=4 house:"Bed and breakfast" superhost`.
//!
//! Parsing never fails: unknown keys and values that do not parse are
//! dropped, leaving that dimension unconstrained.

use crate::query::criteria::{FilterCriteria, RangeFilter};

/// A parsed filter expression
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterQuery {
    pub criteria: FilterCriteria,
    /// Bare words, joined by single spaces; used as a name prefix
    pub text: String,
}

impl FilterQuery {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && !self.criteria.has_any()
    }
}

/// Parse only the criteria part of an expression
pub fn parse_filters(input: &str) -> FilterCriteria {
    parse_filter_query(input).criteria
}

/// Parse an expression into criteria plus free text
pub fn parse_filter_query(input: &str) -> FilterQuery {
    let mut parser = FilterParser::new(input);
    parser.parse()
}

struct FilterParser<'a> {
    input: &'a str,
    pos: usize,
    criteria: FilterCriteria,
    words: Vec<String>,
}

impl<'a> FilterParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            criteria: FilterCriteria::default(),
            words: Vec::new(),
        }
    }

    fn parse(&mut self) -> FilterQuery {
        loop {
            self.skip_whitespace();
            if self.is_eof() {
                break;
            }
            self.parse_token();
        }

        FilterQuery {
            criteria: std::mem::take(&mut self.criteria),
            text: self.words.join(" "),
        }
    }

    fn parse_token(&mut self) {
        if self.peek_char() == Some('"') {
            let phrase = self.parse_quoted();
            if !phrase.is_empty() {
                self.words.push(phrase);
            }
            return;
        }

        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_alphanumeric() || ch == '_' || ch == '-' {
                self.advance();
            } else if ch == ':' {
                let key = self.input[start..self.pos].to_lowercase();
                self.advance();
                let value = self.parse_value();
                self.apply_field(&key, &value);
                return;
            } else {
                break;
            }
        }

        // Bare word (possibly with punctuation)
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                break;
            }
            self.advance();
        }
        let word = &self.input[start..self.pos];
        match word.to_lowercase().as_str() {
            "superhost" | "super-host" | "super_host" => self.criteria.super_host_filter = true,
            _ => self.words.push(word.to_string()),
        }
    }

    /// A quoted string or a run of non-whitespace characters
    fn parse_value(&mut self) -> String {
        if self.peek_char() == Some('"') {
            return self.parse_quoted();
        }

        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                break;
            }
            self.advance();
        }
        self.input[start..self.pos].to_string()
    }

    fn parse_quoted(&mut self) -> String {
        self.advance(); // opening quote
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch == '"' {
                break;
            }
            self.advance();
        }
        let text = self.input[start..self.pos].to_string();
        self.advance(); // closing quote, if any
        text
    }

    fn apply_field(&mut self, key: &str, value: &str) {
        match key {
            "loc" | "location" | "country" => {
                self.criteria.location_filter = (!value.is_empty()).then(|| value.to_uppercase());
            }
            "rate" | "price" => {
                if let Some(range) = parse_range(value) {
                    self.criteria.rate_filter = Some(range);
                }
            }
            "stars" | "rating" => {
                if let Some(range) = parse_range(value) {
                    self.criteria.stars_filter = Some(range);
                }
            }
            "house" | "type" => push_categories(&mut self.criteria.house_type_filter, value),
            "place" => push_categories(&mut self.criteria.place_type_filter, value),
            "superhost" | "super-host" | "super_host" => {
                match value.to_lowercase().as_str() {
                    "true" | "yes" | "1" | "on" => self.criteria.super_host_filter = true,
                    "false" | "no" | "0" | "off" => self.criteria.super_host_filter = false,
                    _ => {}
                }
            }
            _ => {
                // Unknown field, ignored
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if !ch.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.peek_char() {
            self.pos += ch.len_utf8();
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }
}

/// Comma separated category names; duplicates are dropped
fn push_categories(target: &mut Vec<String>, value: &str) {
    for item in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !target.iter().any(|existing| existing == item) {
            target.push(item.to_string());
        }
    }
}

/// `N-M`, `N..M`, `>=N`, `<=M`, `>N`, `<M` or `N`; all bounds inclusive
fn parse_range(value: &str) -> Option<RangeFilter> {
    let value = value.trim();

    if let Some(rest) = value.strip_prefix(">=").or_else(|| value.strip_prefix('>')) {
        return RangeFilter::at_least(parse_number(rest)?);
    }
    if let Some(rest) = value.strip_prefix("<=").or_else(|| value.strip_prefix('<')) {
        return RangeFilter::at_most(parse_number(rest)?);
    }
    if let Some((min, max)) = value.split_once("..").or_else(|| value.split_once('-')) {
        return RangeFilter::new(parse_number(min)?, parse_number(max)?);
    }
    RangeFilter::exact(parse_number(value)?)
}

fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim().trim_start_matches('$');
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}
