use nom::{
    IResult,
    bytes::complete::tag_no_case,
    character::complete::multispace1,
    combinator::opt,
    sequence::{preceded, terminated, tuple},
};

use super::{conditions, line_end, name_list, where_clause};
use crate::{
    check,
    rule::{Aspect, Rule},
};

/// `delete from <tables> [where <expr>]`
pub(super) fn compile(line: &str) -> Option<Rule> {
    let (_, (tables, expr)) = terminated(delete_line, line_end)(line).ok()?;
    let rule = Rule::new(tables);
    Some(match expr {
        Some(expr) => rule.with_check(
            Aspect::Where,
            check::conditions(conditions::permissions(expr)),
        ),
        None => rule,
    })
}

fn delete_line(input: &str) -> IResult<&str, (Vec<String>, Option<&str>)> {
    let (input, _) = tuple((
        tag_no_case("delete"),
        multispace1,
        tag_no_case("from"),
        multispace1,
    ))(input)?;
    let (input, tables) = name_list(input)?;
    let (input, expr) = opt(preceded(multispace1, where_clause))(input)?;
    Ok((input, (tables, expr)))
}
