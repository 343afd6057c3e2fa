use nom::{
    IResult,
    bytes::complete::tag_no_case,
    character::complete::{multispace0, multispace1},
    combinator::opt,
    sequence::{preceded, terminated, tuple},
};

use super::{conditions, line_end, name_list, parenthesized_list, where_clause};
use crate::{
    check::{self, ListMessage},
    rule::{Aspect, Rule},
    statement::Statement,
};

/// `update <tables> [set (<fields>)] [where <expr>]`
pub(super) fn compile(line: &str) -> Option<Rule> {
    let (_, (tables, fields, expr)) = terminated(update_line, line_end)(line).ok()?;
    let mut rule = Rule::new(tables);
    if let Some(fields) = fields {
        rule = rule.with_check(
            Aspect::Fields,
            check::listed(fields, Statement::fields, ListMessage::UPDATED),
        );
    }
    if let Some(expr) = expr {
        rule = rule.with_check(
            Aspect::Where,
            check::conditions(conditions::permissions(expr)),
        );
    }
    Some(rule)
}

type UpdateLine<'a> = (Vec<String>, Option<Vec<String>>, Option<&'a str>);

fn update_line(input: &str) -> IResult<&str, UpdateLine<'_>> {
    let (input, _) = tuple((tag_no_case("update"), multispace1))(input)?;
    let (input, tables) = name_list(input)?;
    let (input, fields) = opt(preceded(
        tuple((multispace1, tag_no_case("set"), multispace0)),
        parenthesized_list,
    ))(input)?;
    let (input, expr) = opt(preceded(multispace1, where_clause))(input)?;
    Ok((input, (tables, fields, expr)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_parts() {
        assert_eq!(
            update_line("update t"),
            Ok(("", (vec!["t".into()], None, None)))
        );
        assert_eq!(
            update_line("update t where id(=)"),
            Ok(("", (vec!["t".into()], None, Some("id(=)"))))
        );
        assert_eq!(
            update_line("update t set(a, b)"),
            Ok(("", (vec!["t".into()], Some(vec!["a".into(), "b".into()]), None)))
        );
    }

    #[test]
    fn set_wildcard_still_claims_fields() {
        let rule = compile("update t set (*) where id(=)").map(|rule| rule.aspects().collect());
        assert_eq!(rule, Some(vec![Aspect::Fields, Aspect::Where]));
    }
}
