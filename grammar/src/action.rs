//! Action code substitution.
//!
//! Action code is output text with `$` markers:
//!
//! * `$$` is a literal `$`.
//! * `$N` (N in 1..=9) is the output of the N-th non-terminal of the
//!   alternative, counting non-terminals only.
//! * `$iN` is the input consumed by the N-th symbol of the alternative,
//!   counting terminals and non-terminals.

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::{char, one_of},
    combinator::{all_consuming, map, map_opt, value},
    multi::many0,
    sequence::preceded,
    IResult,
};

use crate::error::GrammarError;

/// A piece of action code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Dollar,
    /// `$N`, 1-based.
    Output(usize),
    /// `$iN`, 1-based.
    Input(usize),
}

/// Split action code into segments.
pub fn segments(code: &str) -> Result<Vec<Segment<'_>>, GrammarError> {
    match all_consuming(many0(segment))(code) {
        Ok((_, segments)) => Ok(segments),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(GrammarError::InvalidAction {
            code: code.to_owned(),
            offset: code.len() - e.input.len(),
        }),
        Err(nom::Err::Incomplete(_)) => Err(GrammarError::InvalidAction {
            code: code.to_owned(),
            offset: code.len(),
        }),
    }
}

fn segment(input: &str) -> IResult<&str, Segment<'_>> {
    alt((
        map(is_not("$"), Segment::Text),
        value(Segment::Dollar, tag("$$")),
        map(preceded(tag("$i"), slot), Segment::Input),
        map(preceded(char('$'), slot), Segment::Output),
    ))(input)
}

fn slot(input: &str) -> IResult<&str, usize> {
    map_opt(one_of("123456789"), |c| c.to_digit(10).map(|d| d as usize))(input)
}

/// Append the expansion of `code` to `out`.
///
/// `positions` holds the cursor before the alternative and after each matched
/// symbol, `outputs` the output of each matched non-terminal.
pub fn expand(
    code: &str,
    input: &str,
    positions: &[usize],
    outputs: &[String],
    out: &mut String,
) -> Result<(), GrammarError> {
    for segment in segments(code)? {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Dollar => out.push('$'),
            Segment::Output(n) => match outputs.get(n - 1) {
                Some(output) => out.push_str(output),
                None => {
                    return Err(GrammarError::ActionIndex {
                        code: code.to_owned(),
                        marker: format!("${}", n),
                        index: n,
                        available: outputs.len(),
                    })
                }
            },
            Segment::Input(n) => match (positions.get(n - 1), positions.get(n)) {
                (Some(&start), Some(&end)) => out.push_str(&input[start..end]),
                _ => {
                    return Err(GrammarError::ActionIndex {
                        code: code.to_owned(),
                        marker: format!("$i{}", n),
                        index: n,
                        available: positions.len().saturating_sub(1),
                    })
                }
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_segments() {
        let tests = vec![
            ("", Some(vec![])),
            ("plain text", Some(vec![Segment::Text("plain text")])),
            (
                "a$1b$i2$$",
                Some(vec![
                    Segment::Text("a"),
                    Segment::Output(1),
                    Segment::Text("b"),
                    Segment::Input(2),
                    Segment::Dollar,
                ]),
            ),
            ("$$1", Some(vec![Segment::Dollar, Segment::Text("1")])),
            ("$91", Some(vec![Segment::Output(9), Segment::Text("1")])),
            ("$", None),
            ("$0", None),
            ("$i", None),
            ("$i0", None),
            ("$x", None),
        ];
        for test in tests {
            let got = segments(test.0).ok();
            assert_eq!(got, test.1, "test case: {:?}", test.0);
        }
    }

    #[test]
    fn invalid_segment_offset() {
        let err = segments("ab $x").unwrap_err();
        assert_eq!(
            err,
            GrammarError::InvalidAction {
                code: "ab $x".to_owned(),
                offset: 3,
            }
        );
    }

    #[test]
    fn expand_markers() {
        let input = "xyz";
        let positions = vec![0, 1, 3];
        let outputs = vec!["A".to_owned(), "B".to_owned()];

        let mut out = String::new();
        expand("[$2$1|$i1|$i2|$$]", input, &positions, &outputs, &mut out).unwrap();
        assert_eq!(out, "[BA|x|yz|$]");
    }

    #[test]
    fn expand_missing_slots() {
        let positions = vec![0, 1];
        let outputs = vec!["A".to_owned()];
        let mut out = String::new();

        let err = expand("$2", "x", &positions, &outputs, &mut out).unwrap_err();
        assert!(matches!(err, GrammarError::ActionIndex { index: 2, available: 1, .. }));

        let err = expand("$i2", "x", &positions, &outputs, &mut out).unwrap_err();
        assert!(matches!(err, GrammarError::ActionIndex { index: 2, available: 1, .. }));
    }
}
