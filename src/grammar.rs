mod conditions;
mod delete;
mod insert;
mod select;
mod update;

use std::collections::HashMap;

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{char, digit1, multispace0, multispace1},
    combinator::{eof, map_res, rest},
    multi::separated_list1,
    sequence::{delimited, preceded, tuple},
};

use crate::{
    rule::Rule,
    statement::StatementKind,
    validator::{Policy, RuleSet},
};

/// Builds a [`Policy`] from one or more policy sources.
///
/// Rules keep their line order; each further source appends to the rules
/// already collected for a statement kind. Lines matching no known shape are
/// skipped.
#[derive(Debug, Default)]
pub struct PolicyCompiler {
    rule_sets: HashMap<StatementKind, RuleSet>,
}

impl PolicyCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, text: &str) -> Self {
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            let rules = compile_line(line);
            if rules.is_empty() {
                if !line.is_empty() {
                    log::trace!("policy line {} ignored: {line}", number + 1);
                }
                continue;
            }
            for (kind, rule) in rules {
                self.rule_sets
                    .entry(kind)
                    .or_insert_with(|| RuleSet::new(kind))
                    .push(rule);
            }
        }
        self
    }

    pub fn build(self) -> Policy {
        Policy::from_rule_sets(self.rule_sets)
    }
}

/// Every rule a single policy line compiles to, in shape order.
pub fn compile_line(line: &str) -> Vec<(StatementKind, Rule)> {
    let mut rules: Vec<(StatementKind, Rule)> = select::compile(line)
        .into_iter()
        .map(|rule| (StatementKind::Select, rule))
        .collect();
    rules.extend(insert::compile(line).map(|rule| (StatementKind::Insert, rule)));
    rules.extend(update::compile(line).map(|rule| (StatementKind::Update, rule)));
    rules.extend(delete::compile(line).map(|rule| (StatementKind::Delete, rule)));
    rules
}

// --- Lexical helpers shared by the line shapes ---

fn name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || matches!(c, '_' | '.' | '$' | '*'))(input)
}

/// `a, b ,c`
fn name_list(input: &str) -> IResult<&str, Vec<String>> {
    let (input, names) =
        separated_list1(delimited(multispace0, char(','), multispace0), name)(input)?;
    Ok((input, names.into_iter().map(str::to_string).collect()))
}

/// `( a, b )`
fn parenthesized_list(input: &str) -> IResult<&str, Vec<String>> {
    delimited(
        tuple((char('('), multispace0)),
        name_list,
        tuple((multispace0, char(')'))),
    )(input)
}

fn number(input: &str) -> IResult<&str, u64> {
    map_res(digit1, str::parse::<u64>)(input)
}

/// `where <expr>` up to the end of the line.
fn where_clause(input: &str) -> IResult<&str, &str> {
    preceded(
        tuple((tag_no_case("where"), alt((multispace1, eof)))),
        rest,
    )(input)
}

/// Trailing whitespace, then nothing.
fn line_end(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, eof)(input)
}
