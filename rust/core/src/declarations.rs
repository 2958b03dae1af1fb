// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Feature property declarations
//!
//! A declaration names a member of a feature's `"properties"` object and
//! gives a default value whose type fixes the column type. Declarations can
//! be added one at a time or from the compact form
//! `name:default,name2:default2`, where quoted defaults are strings and bare
//! defaults are numbers (`1` is an integer, `1.0` or `1e3` a double).

use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::{is_not, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace0, one_of},
    combinator::{all_consuming, map, map_res, opt, recognize, rest},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::value::{AttributeValue, ValueType};

/// One declared property: its name and typed default.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDeclaration {
    pub name: String,
    pub default: AttributeValue,
}

impl PropertyDeclaration {
    #[inline]
    pub fn value_type(&self) -> ValueType {
        self.default.value_type()
    }
}

/// Ordered set of property declarations, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureProperties {
    declarations: Vec<PropertyDeclaration>,
    index: FxHashMap<String, usize>,
}

impl FeatureProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a property. Re-declaring a name replaces the earlier default
    /// but keeps the original column position.
    pub fn add(&mut self, name: impl Into<String>, default: impl Into<AttributeValue>) {
        let name = name.into();
        let default = default.into();
        match self.index.get(&name) {
            Some(&i) => self.declarations[i].default = default,
            None => {
                self.index.insert(name.clone(), self.declarations.len());
                self.declarations.push(PropertyDeclaration { name, default });
            }
        }
    }

    /// Declare every property in a compact `name:default,...` list.
    ///
    /// Either the whole list is applied or, on error, nothing is.
    pub fn add_from_str(&mut self, input: &str) -> Result<()> {
        let parsed = parse_declarations(input)?;
        for (name, default) in parsed {
            self.add(name, default);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PropertyDeclaration> {
        self.index.get(name).map(|&i| &self.declarations[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyDeclaration> {
        self.declarations.iter()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl FromStr for FeatureProperties {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut properties = FeatureProperties::new();
        properties.add_from_str(s)?;
        Ok(properties)
    }
}

/// Parse a compact declaration list into ordered `(name, default)` pairs.
pub fn parse_declarations(input: &str) -> Result<Vec<(String, AttributeValue)>> {
    split_entries(input)
        .into_iter()
        .filter(|entry| !entry.trim().is_empty())
        .map(parse_entry)
        .collect()
}

/// Split on commas that are not inside a quoted default
fn split_entries(input: &str) -> Vec<&str> {
    separated_list0(char(','), raw_entry)(input)
        .map(|(_, entries)| entries)
        .unwrap_or_else(|_| vec![input])
}

/// Raw text of one entry. Quotes only open after the colon; an unclosed
/// quote runs to the end of the input.
fn raw_entry(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while(|c: char| c != ':' && c != ','),
        opt(preceded(
            char(':'),
            many0(alt((
                recognize(delimited(char('"'), take_while(|c: char| c != '"'), char('"'))),
                recognize(delimited(char('\''), take_while(|c: char| c != '\''), char('\''))),
                recognize(pair(one_of("\"'"), rest)),
                is_not(",\"'"),
            ))),
        )),
    ))(input)
}

fn parse_entry(entry: &str) -> Result<(String, AttributeValue)> {
    if !entry.contains(':') {
        return Err(Error::InvalidPropertyDeclaration(format!(
            "missing ':' in {:?}",
            entry.trim()
        )));
    }

    match declaration(entry) {
        Ok((_, (name, _))) if name.is_empty() => Err(Error::InvalidPropertyDeclaration(format!(
            "empty property name in {:?}",
            entry.trim()
        ))),
        Ok((_, (name, default))) => Ok((name.to_string(), default)),
        Err(_) => Err(Error::InvalidPropertyDeclaration(format!(
            "invalid default value in {:?}",
            entry.trim()
        ))),
    }
}

/// Parse `name : default` covering the whole entry
fn declaration(input: &str) -> IResult<&str, (&str, AttributeValue)> {
    all_consuming(pair(
        property_name,
        preceded(char(':'), delimited(multispace0, default_value, multispace0)),
    ))(input)
}

/// Property name: everything up to the colon, trimmed
fn property_name(input: &str) -> IResult<&str, &str> {
    map(take_while1(|c: char| c != ':'), str::trim)(input)
}

fn default_value(input: &str) -> IResult<&str, AttributeValue> {
    alt((quoted_string, number))(input)
}

/// Quoted string default: "text" or 'text'
/// A doubled quote inside the string stands for one quote character
fn quoted_string(input: &str) -> IResult<&str, AttributeValue> {
    fn content(input: &str, quote: char) -> IResult<&str, String> {
        let mut out = String::new();
        let mut chars = input.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            if c == quote {
                if matches!(chars.peek(), Some(&(_, next)) if next == quote) {
                    out.push(quote);
                    chars.next();
                    continue;
                }
                return Ok((&input[i..], out));
            }
            out.push(c);
        }

        // No closing quote found
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )))
    }

    map(
        alt((
            delimited(char('"'), |i| content(i, '"'), char('"')),
            delimited(char('\''), |i| content(i, '\''), char('\'')),
        )),
        AttributeValue::String,
    )(input)
}

/// Bare numeric default: 42, -3, 0.0, .5, 1e-3
fn number(input: &str) -> IResult<&str, AttributeValue> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            alt((
                recognize(pair(digit1, opt(pair(char('.'), digit0)))),
                recognize(pair(char('.'), digit1)),
            )),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |s: &str| -> std::result::Result<AttributeValue, String> {
            if s.contains(|c: char| matches!(c, '.' | 'e' | 'E')) {
                fast_float::parse::<f64, _>(s)
                    .map(AttributeValue::Double)
                    .map_err(|_| format!("invalid number {:?}", s))
            } else {
                s.trim_start_matches('+')
                    .parse::<i64>()
                    .map(AttributeValue::Int)
                    .map_err(|e| e.to_string())
            }
        },
    )(input)
}
