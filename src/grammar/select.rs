//! `select <fields> from <tables> ...` lines.
//!
//! The header names the fields and tables; every clause recognised anywhere
//! in the remainder adds a rule of its own over the same tables.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::multispace1,
    combinator::{opt, recognize},
    sequence::{preceded, tuple},
};

use super::{conditions, name_list, number, where_clause};
use crate::{
    check::{self, ListMessage},
    rule::{Aspect, Rule},
    statement::Statement,
};

pub(super) fn compile(line: &str) -> Vec<Rule> {
    let Ok((tail, (fields, tables))) = header(line) else {
        return Vec::new();
    };
    let words = words(tail);
    let rule = || Rule::new(tables.iter().cloned());

    let mut rules = vec![rule().with_check(
        Aspect::Fields,
        check::listed(fields, Statement::fields, ListMessage::QUERIED),
    )];

    if let Some(ceiling) = first_clause(tail, &words, limit_clause) {
        rules.push(rule().with_check(Aspect::Limit, check::limit(ceiling)));
    }
    if let Some(columns) = first_clause(tail, &words, order_by_clause) {
        rules.push(rule().with_check(
            Aspect::OrderBy,
            check::listed(columns, Statement::order_by, ListMessage::ORDER_BY),
        ));
    }
    if let Some(columns) = first_clause(tail, &words, group_by_clause) {
        rules.push(rule().with_check(
            Aspect::GroupBy,
            check::listed(columns, Statement::group_by, ListMessage::GROUP_BY),
        ));
    }
    let joined = join_tables(tail, &words, Join::Inner);
    if !joined.is_empty() {
        rules.push(rule().with_check(
            Aspect::InnerJoin,
            check::listed(joined, Statement::inner_joins, ListMessage::INNER_JOIN),
        ));
    }
    let joined = join_tables(tail, &words, Join::Outer);
    if !joined.is_empty() {
        rules.push(rule().with_check(
            Aspect::OuterJoin,
            check::listed(joined, Statement::outer_joins, ListMessage::OUTER_JOIN),
        ));
    }
    if let Some(expr) = first_clause(tail, &words, where_clause) {
        rules.push(rule().with_check(
            Aspect::Where,
            check::conditions(conditions::permissions(expr)),
        ));
    }
    rules
}

fn header(input: &str) -> IResult<&str, (Vec<String>, Vec<String>)> {
    let (input, _) = tuple((tag_no_case("select"), multispace1))(input)?;
    let (input, fields) = name_list(input)?;
    let (input, _) = tuple((multispace1, tag_no_case("from"), multispace1))(input)?;
    let (input, tables) = name_list(input)?;
    Ok((input, (fields, tables)))
}

/// Byte offset and text of each whitespace separated word.
fn words(text: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (false, None) => start = Some(i),
            (true, Some(s)) => {
                words.push((s, &text[s..i]));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        words.push((s, &text[s..]));
    }
    words
}

/// Try `parser` at each word start, keeping the leftmost success.
fn first_clause<'a, T>(
    tail: &'a str,
    words: &[(usize, &'a str)],
    mut parser: impl FnMut(&'a str) -> IResult<&'a str, T>,
) -> Option<T> {
    words
        .iter()
        .find_map(|(offset, _)| parser(&tail[*offset..]).ok().map(|(_, value)| value))
}

fn limit_clause(input: &str) -> IResult<&str, u64> {
    preceded(tuple((tag_no_case("limit"), multispace1)), number)(input)
}

fn order_by_clause(input: &str) -> IResult<&str, Vec<String>> {
    preceded(
        tuple((
            tag_no_case("order"),
            multispace1,
            tag_no_case("by"),
            multispace1,
        )),
        name_list,
    )(input)
}

fn group_by_clause(input: &str) -> IResult<&str, Vec<String>> {
    preceded(
        tuple((
            tag_no_case("group"),
            multispace1,
            tag_no_case("by"),
            multispace1,
        )),
        name_list,
    )(input)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Join {
    Inner,
    Outer,
}

/// `[inner] join a, b`
fn inner_join(input: &str) -> IResult<&str, Vec<String>> {
    preceded(
        tuple((
            opt(tuple((tag_no_case("inner"), multispace1))),
            tag_no_case("join"),
            multispace1,
        )),
        name_list,
    )(input)
}

/// `left [outer] join a` or `outer join a`
fn outer_join(input: &str) -> IResult<&str, Vec<String>> {
    preceded(
        tuple((
            alt((
                recognize(tuple((
                    tag_no_case("left"),
                    multispace1,
                    tag_no_case("outer"),
                ))),
                tag_no_case("left"),
                tag_no_case("outer"),
            )),
            multispace1,
            tag_no_case("join"),
            multispace1,
        )),
        name_list,
    )(input)
}

/// All tables named by joins of one flavour, merged in line order.
fn join_tables(tail: &str, words: &[(usize, &str)], join: Join) -> Vec<String> {
    let mut tables: Vec<String> = Vec::new();
    for (i, (offset, _)) in words.iter().enumerate() {
        // A join already parsed from the preceding word.
        let previous = i.checked_sub(1).map(|p| words[p].1);
        let continues = |keywords: &[&str]| {
            previous.is_some_and(|word| keywords.iter().any(|k| word.eq_ignore_ascii_case(k)))
        };
        let parsed = match join {
            Join::Inner if !continues(&["inner", "left", "outer"]) => inner_join(&tail[*offset..]),
            Join::Outer if !continues(&["left"]) => outer_join(&tail[*offset..]),
            _ => continue,
        };
        if let Ok((_, names)) = parsed {
            for name in names {
                if !tables.contains(&name) {
                    tables.push(name);
                }
            }
        }
    }
    tables
}
