//! Compact notation for one player's share of a hand.
//!
//! Tokens are `<K|Q|D|C>[count][x]`, separated by spaces or commas, e.g.
//! `"K Q2x D3"`. The count defaults to 1 and a trailing `x` marks the entry
//! doubled. `-` or an empty string means the player took nothing.

use crate::error::{Result, TrixError};
use crate::model::{Category, PlayerEntries};
use nom::{
    bytes::complete::take_while,
    character::complete::{digit1, one_of},
    combinator::{map, map_opt, map_res, opt},
    multi::many0,
    sequence::{preceded, terminated},
    IResult, Parser,
};

/// One parsed token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandToken {
    pub category: Category,
    pub count: u32,
    pub doubled: bool,
}

fn separator(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c.is_whitespace() || c == ',').parse(input)
}

fn category(input: &str) -> IResult<&str, Category> {
    map_opt(one_of("KQDCkqdc"), Category::from_char).parse(input)
}

fn count(input: &str) -> IResult<&str, u32> {
    map_res(digit1, str::parse::<u32>).parse(input)
}

fn doubled_marker(input: &str) -> IResult<&str, bool> {
    map(opt(one_of("xX")), |m: Option<char>| m.is_some()).parse(input)
}

fn token(input: &str) -> IResult<&str, HandToken> {
    let (input, (cat, n, doubled)) = (category, opt(count), doubled_marker).parse(input)?;
    Ok((
        input,
        HandToken {
            category: cat,
            count: n.unwrap_or(1),
            doubled,
        },
    ))
}

fn tokens(input: &str) -> IResult<&str, Vec<HandToken>> {
    preceded(separator, many0(terminated(token, separator))).parse(input)
}

/// Parse a notation string into its tokens
pub fn parse_tokens(s: &str) -> Result<Vec<HandToken>> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return Ok(Vec::new());
    }

    match tokens(trimmed) {
        Ok(("", parsed)) => Ok(parsed),
        Ok((rest, _)) => Err(TrixError::InvalidNotation(format!(
            "unexpected '{}' in '{}'",
            rest, trimmed
        ))),
        Err(e) => Err(TrixError::InvalidNotation(format!("'{}': {}", trimmed, e))),
    }
}

/// Parse a notation string into entries. Repeated categories add up, and
/// no category may go past its maximum.
pub fn parse_entries(s: &str) -> Result<PlayerEntries> {
    let mut entries = PlayerEntries::default();
    for t in parse_tokens(s)? {
        let entry = entries.get_mut(t.category);
        entry.count = entry.count.saturating_add(t.count);
        entry.doubled |= t.doubled;

        if entry.count > t.category.max_count() {
            return Err(TrixError::InvalidNotation(format!(
                "{} count {} in '{}' exceeds maximum ({})",
                t.category,
                entry.count,
                s.trim(),
                t.category.max_count()
            )));
        }
    }
    Ok(entries)
}
