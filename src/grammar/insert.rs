use nom::{
    IResult,
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, multispace0, multispace1},
    combinator::{map, opt, value},
    sequence::{preceded, terminated, tuple},
};

use super::{line_end, name_list, number, parenthesized_list};
use crate::{
    check::{self, ListMessage},
    rule::{Aspect, Rule},
    statement::Statement,
};

/// `insert into <tables> (<fields>) [limit <n>|*]`
pub(super) fn compile(line: &str) -> Option<Rule> {
    let (_, (tables, fields, ceiling)) = terminated(insert_line, line_end)(line).ok()?;
    let mut rule = Rule::new(tables).with_check(
        Aspect::Fields,
        check::listed(fields, Statement::fields, ListMessage::INSERTED),
    );
    if let Some(ceiling) = ceiling {
        rule = rule.with_check(Aspect::Limit, check::limit(ceiling));
    }
    Some(rule)
}

type InsertLine = (Vec<String>, Vec<String>, Option<u64>);

fn insert_line(input: &str) -> IResult<&str, InsertLine> {
    let (input, _) = tuple((
        tag_no_case("insert"),
        multispace1,
        tag_no_case("into"),
        multispace1,
    ))(input)?;
    let (input, tables) = name_list(input)?;
    let (input, fields) = preceded(multispace0, parenthesized_list)(input)?;
    let (input, ceiling) = opt(preceded(
        tuple((multispace1, tag_no_case("limit"), multispace1)),
        alt((value(None, char('*')), map(number, Some))),
    ))(input)?;
    Ok((input, (tables, fields, ceiling.flatten())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_limits() {
        assert_eq!(
            insert_line("insert into a, b (x, y) limit 3"),
            Ok((
                "",
                (
                    vec!["a".into(), "b".into()],
                    vec!["x".into(), "y".into()],
                    Some(3)
                )
            ))
        );
        assert_eq!(
            insert_line("INSERT INTO a(x) LIMIT *").map(|(_, line)| line.2),
            Ok(None)
        );
    }

    #[test]
    fn trailing_text_rejects_the_line() {
        assert!(compile("insert into a (x) limit").is_none());
        assert!(compile("insert into a (x) values").is_none());
        assert!(compile("insert into a (x)  ").is_some());
    }
}
