//! A very simple csv parser that acts only on numbers. Each record is
//! rewritten as a bracketed list.

use parsegen::{Error, Grammar, Interpreter};

const CSV: &str = r"
# A csv may have 0 or more records.
<export>
Csv = Record Csv {$1$2}
    | ;

# A record contains fields, and is terminated by a newline.
Record = Fields '\n' {[$1]} ;

# Fields contains 1 or more fields separated by a comma.
Fields = Field ',' Fields {$1, $2}
       | Field {$1} ;

# A field contains 1 or more digits.
Field = Digit Digits {$i1$i2} ;
Digits = Digit Digits | ;

Digit = <range> '09' ;
";

fn parse(rule: &str, input: &str) -> Result<String, Error> {
    let grammar: Grammar = CSV.parse().unwrap();
    Interpreter::new(&grammar).parse_with(rule, input)
}

#[test]
fn digit() {
    assert_eq!(parse("Digit", "7"), Ok(String::new()));
    assert!(parse("Digit", "x").is_err());
}

#[test]
fn field() {
    assert_eq!(parse("Field", "789"), Ok("789".to_owned()));
}

#[test]
fn fields() {
    assert_eq!(parse("Fields", "123,789"), Ok("123, 789".to_owned()));
}

#[test]
fn record() {
    assert_eq!(parse("Record", "123,789\n"), Ok("[123, 789]".to_owned()));
    assert!(parse("Record", "123,789").is_err());
}

#[test]
fn csv() {
    let grammar: Grammar = CSV.parse().unwrap();
    let got = Interpreter::new(&grammar).parse("184,754\n33,22222\n");
    assert_eq!(got, Ok("[184, 754][33, 22222]".to_owned()));
}

#[test]
fn csv_empty() {
    let grammar: Grammar = CSV.parse().unwrap();
    assert_eq!(Interpreter::new(&grammar).parse(""), Ok(String::new()));
}
