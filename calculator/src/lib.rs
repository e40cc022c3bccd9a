//! Infix to postfix conversion for simple arithmetic, derived from
//! `calculator.rspt`.

use derive::Parser;

#[derive(Parser)]
#[grammar_file = "calculator.rspt"]
pub struct Calculator;

/// Same conversion, but every rule is exported so pieces of an expression can
/// be converted on their own.
#[derive(Parser)]
#[grammar_inline = "
<export> Sum = Product '+' Sum {$1 $2 +} | Product {$1} ;
<export> Product = Number '*' Product {$1 $2 *} | Number {$1} ;
<export> Number = <range> '09' Number {$i1$1} | <range> '09' {$i1} ;
"]
pub struct RightAssoc;

#[cfg(test)]
mod tests {
    use super::*;
    use parsegen::{Error, Grammar, Interpreter, Parser, ParseError};

    const GRAMMAR: &str = include_str!("../calculator.rspt");
    const CLASSES: &str = include_str!("../classes.rspt");

    #[derive(derive::Parser)]
    #[grammar_file = "classes.rspt"]
    struct Classes;

    #[test]
    fn postfix() {
        let tests = vec![
            ("7", "7"),
            ("42", "42"),
            ("1+2", "1 2 +"),
            ("1+2-3", "1 2 + 3 -"),
            ("2*3+4", "2 3 * 4 +"),
            ("2+3*4", "2 3 4 * +"),
            ("2*(3+4)", "2 3 4 + *"),
            ("((1))", "1"),
            ("8/4/2", "8 4 / 2 /"),
        ];

        for test in tests {
            assert_eq!(
                Calculator::parse(test.0),
                Ok(test.1.to_owned()),
                "test case: {:?}",
                test
            );
        }
    }

    #[test]
    fn rejected() {
        let tests = vec![
            ("", 0),
            ("1+", 1),
            ("(1", 0),
            ("1 + 2", 1),
            ("2*(3+4))", 7),
        ];

        for test in tests {
            match Calculator::parse(test.0) {
                Err(Error::Parse(ParseError { offset, .. })) => {
                    assert_eq!(offset, test.1, "test case: {:?}", test)
                }
                other => panic!("test case: {:?}, got {:?}", test, other),
            }
        }
    }

    #[test]
    fn matches_interpreter() {
        let grammar: Grammar = GRAMMAR.parse().unwrap();
        let interpreter = Interpreter::new(&grammar);
        for input in ["1", "1+2*3", "(1+2)*3", "9-8-7", "1+", "x", "12*(3/4)-5"] {
            assert_eq!(
                Calculator::parse(input),
                interpreter.parse(input),
                "input: {}",
                input
            );
        }
    }

    #[test]
    fn classes() {
        // Err holds the reported offset.
        let tests = vec![
            ("xq", Ok("p[x]")),
            ("yc5", Ok("r(y|5|c|$)")),
            ("xc", Ok("r(x|e|c|$)")),
            ("xa", Err(0)),
            ("", Err(0)),
            // The first alternative matches "yq" and is not revisited.
            ("yq1", Err(2)),
        ];

        for test in tests {
            let expected = match test.1 {
                Ok(out) => Ok(out.to_owned()),
                Err(offset) => Err(Error::Parse(ParseError::new(test.0, offset))),
            };
            assert_eq!(Classes::parse(test.0), expected, "test case: {:?}", test);
        }
    }

    #[test]
    fn classes_match_interpreter() {
        let grammar: Grammar = CLASSES.parse().unwrap();
        let interpreter = Interpreter::new(&grammar);
        for input in ["xq", "yc5", "xc", "xa", "", "yq1", "xqq", "zq", "yb9"] {
            assert_eq!(
                Classes::parse(input),
                interpreter.parse(input),
                "input: {:?}",
                input
            );
        }
    }

    #[test]
    fn export_methods() {
        assert_eq!(Calculator::parse_Expr("3*4"), Ok("3 4 *".to_owned()));

        assert_eq!(RightAssoc::parse_Sum("1+2+3"), Ok("1 2 3 + +".to_owned()));
        assert_eq!(RightAssoc::parse_Product("2*3"), Ok("2 3 *".to_owned()));
        assert_eq!(RightAssoc::parse_Number("123"), Ok("123".to_owned()));
        assert!(RightAssoc::parse_Number("1+2").is_err());
    }
}
