use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::{alpha1, alphanumeric1, char, multispace1, not_line_ending},
    combinator::{map, opt, recognize, value},
    multi::{many0, many0_count},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use crate::{Error, Grammar, Identifier, Lhs, Production, Rhs, Terminal};

/// Skip whitespace and `#` comments.
fn ws(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0_count(alt((
            multispace1,
            recognize(pair(char('#'), not_line_ending)),
        ))),
    )(input)
}

/// Run a parser after skipping leading whitespace.
fn token<'a, O, F>(f: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    preceded(ws, f)
}

/// Ensure nothing but whitespace remains after a complete parse.
pub fn expect_end(input: &str, rest: &str) -> Result<(), Error> {
    let (rest, _) = ws(rest).map_err(|e| Error::from_nom(input, e))?;
    if rest.is_empty() {
        Ok(())
    } else {
        Err(Error::at(input, rest))
    }
}

pub fn terminal(input: &str) -> IResult<&str, Terminal> {
    map(delimited(char('\''), is_not("'"), char('\'')), |s: &str| {
        Terminal(s.to_owned())
    })(input)
}

pub fn soft_terminal(input: &str) -> IResult<&str, Terminal> {
    map(delimited(char('"'), is_not("\""), char('"')), |s: &str| {
        Terminal(s.to_owned())
    })(input)
}

pub fn identifier(input: &str) -> IResult<&str, Identifier> {
    let (rem, matched) = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)?;
    Ok((rem, Identifier(matched.to_owned())))
}

pub fn lhs(input: &str) -> IResult<&str, Lhs> {
    map(
        pair(
            identifier,
            opt(delimited(
                token(char('[')),
                token(identifier),
                token(char(']')),
            )),
        ),
        |(name, kind)| Lhs { name, kind },
    )(input)
}

/// Ordered alternation, the loosest binding level.
pub fn rhs(input: &str) -> IResult<&str, Rhs> {
    map(
        pair(sequence, many0(preceded(token(char('|')), sequence))),
        |(first, mut rest)| {
            if rest.is_empty() {
                first
            } else {
                rest.insert(0, first);
                Rhs::Alternation(rest)
            }
        },
    )(input)
}

/// Items separated by whitespace or commas.
fn sequence(input: &str) -> IResult<&str, Rhs> {
    map(
        pair(item, many0(preceded(opt(token(char(','))), item))),
        |(first, mut rest)| {
            if rest.is_empty() {
                first
            } else {
                rest.insert(0, first);
                Rhs::Concatenation(rest)
            }
        },
    )(input)
}

fn item(input: &str) -> IResult<&str, Rhs> {
    alt((
        map(
            pair(terminated(token(identifier), char(':')), prefixed),
            |(label, rhs)| Rhs::Labeled(label, Box::new(rhs)),
        ),
        prefixed,
    ))(input)
}

fn prefixed(input: &str) -> IResult<&str, Rhs> {
    alt((
        map(preceded(token(char('&')), postfix), |rhs| {
            Rhs::Lookahead(Box::new(rhs))
        }),
        map(preceded(token(char('!')), postfix), |rhs| {
            Rhs::NegativeLookahead(Box::new(rhs))
        }),
        value(Rhs::Cut, token(char('~'))),
        exception,
    ))(input)
}

fn exception(input: &str) -> IResult<&str, Rhs> {
    map(
        pair(postfix, opt(preceded(token(char('-')), postfix))),
        |(rhs, except)| match except {
            Some(except) => Rhs::Exception(Box::new(rhs), Box::new(except)),
            None => rhs,
        },
    )(input)
}

fn postfix(input: &str) -> IResult<&str, Rhs> {
    map(
        pair(
            primary,
            opt(token(alt((char('*'), char('+'), char('?'))))),
        ),
        |(rhs, op)| match op {
            Some('*') => Rhs::Repeat(Box::new(rhs)),
            Some('+') => Rhs::RepeatOne(Box::new(rhs)),
            Some('?') => Rhs::Optional(Box::new(rhs)),
            _ => rhs,
        },
    )(input)
}

fn primary(input: &str) -> IResult<&str, Rhs> {
    preceded(
        ws,
        alt((
            map(identifier, Rhs::Identifier),
            map(terminal, Rhs::Terminal),
            map(soft_terminal, Rhs::SoftTerminal),
            value(Rhs::Any, char('.')),
            map(delimited(char('('), rhs, token(char(')'))), |rhs| {
                Rhs::Group(Box::new(rhs))
            }),
            map(delimited(char('['), rhs, token(char(']'))), |rhs| {
                Rhs::Optional(Box::new(rhs))
            }),
            map(delimited(char('{'), rhs, token(char('}'))), |rhs| {
                Rhs::Repeat(Box::new(rhs))
            }),
        )),
    )(input)
}

pub fn production(input: &str) -> IResult<&str, Production> {
    map(
        tuple((token(lhs), token(char('=')), rhs, token(char(';')))),
        |(lhs, _, rhs, _)| Production { lhs, rhs },
    )(input)
}

pub fn grammar(input: &str) -> IResult<&str, Grammar> {
    map(terminated(many0(production), ws), |rules| Grammar { rules })(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Debug;

    struct TestCase<T> {
        input: &'static str,
        // Some indicates success, None indicates error.
        out: Option<IResult<&'static str, T>>,
    }

    fn assert_test_cases<T, F>(f: F, tests: Vec<TestCase<T>>)
    where
        T: Debug + Eq,
        F: Fn(&'static str) -> IResult<&'static str, T>,
    {
        for t in tests {
            let res = f(t.input);
            match t.out {
                Some(out) => assert_eq!(res, out, "input: {:?}", t.input),
                None => assert!(res.is_err(), "expected error: {:?}", res),
            }
        }
    }

    fn iden(s: &str) -> Rhs {
        Rhs::Identifier(Identifier(s.to_owned()))
    }

    fn boxed(s: &str) -> Box<Rhs> {
        Box::new(iden(s))
    }

    #[test]
    fn parse_terminal() {
        let tests = vec![
            TestCase {
                input: "'hello'",
                out: Some(Ok(("", Terminal("hello".to_owned())))),
            },
            TestCase {
                input: "'hello' world",
                out: Some(Ok((" world", Terminal("hello".to_owned())))),
            },
            TestCase {
                input: "'->' world",
                out: Some(Ok((" world", Terminal("->".to_owned())))),
            },
            TestCase {
                input: "'hello\" world",
                out: None,
            },
            TestCase {
                input: "\"hello\"",
                out: None,
            },
        ];

        assert_test_cases(terminal, tests);
    }

    #[test]
    fn parse_soft_terminal() {
        let tests = vec![
            TestCase {
                input: "\"match\" x",
                out: Some(Ok((" x", Terminal("match".to_owned())))),
            },
            TestCase {
                input: "'match'",
                out: None,
            },
        ];

        assert_test_cases(soft_terminal, tests);
    }

    #[test]
    fn parse_identifier() {
        let tests = vec![
            TestCase {
                input: "hello",
                out: Some(Ok(("", Identifier("hello".to_owned())))),
            },
            TestCase {
                input: "hello world",
                out: Some(Ok((" world", Identifier("hello".to_owned())))),
            },
            TestCase {
                input: "hello=world",
                out: Some(Ok(("=world", Identifier("hello".to_owned())))),
            },
            TestCase {
                input: "_private1 x",
                out: Some(Ok((" x", Identifier("_private1".to_owned())))),
            },
            TestCase {
                input: "1abc",
                out: None,
            },
        ];

        assert_test_cases(identifier, tests);
    }

    #[test]
    fn parse_rhs() {
        let tests = vec![
            TestCase {
                input: "[ test ]",
                out: Some(Ok(("", Rhs::Optional(boxed("test"))))),
            },
            TestCase {
                input: "{ test }",
                out: Some(Ok(("", Rhs::Repeat(boxed("test"))))),
            },
            TestCase {
                input: "( test )",
                out: Some(Ok(("", Rhs::Group(boxed("test"))))),
            },
            TestCase {
                input: "hello | world",
                out: Some(Ok((
                    "",
                    Rhs::Alternation(vec![iden("hello"), iden("world")]),
                ))),
            },
            TestCase {
                input: "a | b | c",
                out: Some(Ok((
                    "",
                    Rhs::Alternation(vec![iden("a"), iden("b"), iden("c")]),
                ))),
            },
            TestCase {
                input: "hello , world",
                out: Some(Ok((
                    "",
                    Rhs::Concatenation(vec![iden("hello"), iden("world")]),
                ))),
            },
            TestCase {
                input: "hello world",
                out: Some(Ok((
                    "",
                    Rhs::Concatenation(vec![iden("hello"), iden("world")]),
                ))),
            },
            TestCase {
                input: "hello - 'world'",
                out: Some(Ok((
                    "",
                    Rhs::Exception(boxed("hello"), Box::new(Rhs::Terminal("world".into()))),
                ))),
            },
            TestCase {
                input: "hello | ( \"hello\" | world )",
                out: Some(Ok((
                    "",
                    Rhs::Alternation(vec![
                        iden("hello"),
                        Rhs::Group(Box::new(Rhs::Alternation(vec![
                            Rhs::SoftTerminal("hello".into()),
                            iden("world"),
                        ]))),
                    ]),
                ))),
            },
            TestCase {
                input: "a+ b* c?",
                out: Some(Ok((
                    "",
                    Rhs::Concatenation(vec![
                        Rhs::RepeatOne(boxed("a")),
                        Rhs::Repeat(boxed("b")),
                        Rhs::Optional(boxed("c")),
                    ]),
                ))),
            },
            TestCase {
                input: "&'(' !b ~ .",
                out: Some(Ok((
                    "",
                    Rhs::Concatenation(vec![
                        Rhs::Lookahead(Box::new(Rhs::Terminal("(".into()))),
                        Rhs::NegativeLookahead(boxed("b")),
                        Rhs::Cut,
                        Rhs::Any,
                    ]),
                ))),
            },
            TestCase {
                input: "target:NAME '=' value:NUMBER",
                out: Some(Ok((
                    "",
                    Rhs::Concatenation(vec![
                        Rhs::Labeled("target".into(), boxed("NAME")),
                        Rhs::Terminal("=".into()),
                        Rhs::Labeled("value".into(), boxed("NUMBER")),
                    ]),
                ))),
            },
            TestCase {
                input: "a # trailing comment\n | b",
                out: Some(Ok(("", Rhs::Alternation(vec![iden("a"), iden("b")])))),
            },
            TestCase {
                input: "| a",
                out: None,
            },
        ];

        assert_test_cases(rhs, tests);
    }

    #[test]
    fn parse_production() {
        let tests = vec![
            TestCase {
                input: "a = b;",
                out: Some(Ok((
                    "",
                    Production {
                        lhs: Lhs::from("a"),
                        rhs: iden("b"),
                    },
                ))),
            },
            TestCase {
                input: "rule = lhs , \"=\" , rhs ;",
                out: Some(Ok((
                    "",
                    Production {
                        lhs: Lhs::from("rule"),
                        rhs: Rhs::Concatenation(vec![
                            iden("lhs"),
                            Rhs::SoftTerminal("=".into()),
                            iden("rhs"),
                        ]),
                    },
                ))),
            },
            TestCase {
                input: "assign[Assign] = NAME '=' NUMBER ;",
                out: Some(Ok((
                    "",
                    Production {
                        lhs: Lhs::with_kind("assign", "Assign"),
                        rhs: Rhs::Concatenation(vec![
                            iden("NAME"),
                            Rhs::Terminal("=".into()),
                            iden("NUMBER"),
                        ]),
                    },
                ))),
            },
            TestCase {
                input: "a = b; c = d;",
                out: Some(Ok((
                    " c = d;",
                    Production {
                        lhs: Lhs::from("a"),
                        rhs: iden("b"),
                    },
                ))),
            },
            TestCase {
                input: "a = ;",
                out: None,
            },
        ];

        assert_test_cases(production, tests);
    }

    #[test]
    fn parse_grammar() {
        let tests = vec![
            TestCase {
                input: "a = b;",
                out: Some(Ok((
                    "",
                    Grammar {
                        rules: vec![Production {
                            lhs: Lhs::from("a"),
                            rhs: iden("b"),
                        }],
                    },
                ))),
            },
            TestCase {
                input: "# start\na = b;\n\nc = d;\n",
                out: Some(Ok((
                    "",
                    Grammar {
                        rules: vec![
                            Production {
                                lhs: Lhs::from("a"),
                                rhs: iden("b"),
                            },
                            Production {
                                lhs: Lhs::from("c"),
                                rhs: iden("d"),
                            },
                        ],
                    },
                ))),
            },
        ];

        assert_test_cases(grammar, tests);
    }
}
