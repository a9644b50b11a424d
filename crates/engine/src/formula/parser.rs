// Formula parser - converts formula strings into a typed expression.
// Supports: unsigned integer literals, cell refs (A1), and at most one
// binary operation (+, -, *, /). Whitespace is insignificant.

use crate::coord::{self, Coord};

/// One side of an operation: a literal integer or a cell reference.
///
/// A reference is a position, not a value; it is looked up against the grid
/// at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Literal(i64),
    Ref(Coord),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

/// Parsed formula. The grammar admits no nesting, so both shapes are flat:
/// a bare operand, or exactly one operation between two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expr {
    Operand(Operand),
    Binary { op: Op, left: Operand, right: Operand },
}

/// Parse a formula string (with leading `=`) into an expression.
///
/// Only inspects the text of this one cell; reference targets are not
/// checked against any grid here.
pub fn parse(formula: &str) -> Result<Expr, String> {
    let formula = formula.trim();
    let Some(input) = formula.strip_prefix('=') else {
        return Err("formula must start with =".to_string());
    };

    let tokens = tokenize(input)?;
    parse_expr(&tokens)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(i64),
    Ref(Coord),
    Plus,
    Minus,
    Star,
    Slash,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_ascii_whitespace() => {
                chars.next();
            }
            '+' => {
                tokens.push(Token::Plus);
                chars.next();
            }
            '-' => {
                tokens.push(Token::Minus);
                chars.next();
            }
            '*' => {
                tokens.push(Token::Star);
                chars.next();
            }
            '/' => {
                tokens.push(Token::Slash);
                chars.next();
            }
            'A'..='Z' | 'a'..='z' => {
                let mut ident = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_alphanumeric() {
                        ident.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match coord::coordinate_of(&ident) {
                    Some(target) => tokens.push(Token::Ref(target)),
                    None => return Err(format!("invalid cell reference: {ident}")),
                }
            }
            '0'..='9' => {
                let mut num_str = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        num_str.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let num: i64 = num_str
                    .parse()
                    .map_err(|_| format!("invalid number: {num_str}"))?;
                tokens.push(Token::Number(num));
            }
            _ => return Err(format!("unexpected character: {c}")),
        }
    }

    Ok(tokens)
}

fn parse_expr(tokens: &[Token]) -> Result<Expr, String> {
    match tokens {
        [] => Err("empty formula".to_string()),
        [single] => Ok(Expr::Operand(operand(single)?)),
        [left, op, right] => Ok(Expr::Binary {
            op: operator(op)?,
            left: operand(left)?,
            right: operand(right)?,
        }),
        [left, op] => {
            operand(left)?;
            operator(op)?;
            Err("missing right operand".to_string())
        }
        _ => Err("at most one operation per formula".to_string()),
    }
}

fn operand(token: &Token) -> Result<Operand, String> {
    match token {
        Token::Number(n) => Ok(Operand::Literal(*n)),
        Token::Ref(target) => Ok(Operand::Ref(*target)),
        _ => Err(format!("expected operand, found {}", describe(token))),
    }
}

fn operator(token: &Token) -> Result<Op, String> {
    match token {
        Token::Plus => Ok(Op::Add),
        Token::Minus => Ok(Op::Sub),
        Token::Star => Ok(Op::Mul),
        Token::Slash => Ok(Op::Div),
        _ => Err(format!("expected operator, found {}", describe(token))),
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Number(n) => n.to_string(),
        Token::Ref(target) => target.to_string(),
        Token::Plus => "+".to_string(),
        Token::Minus => "-".to_string(),
        Token::Star => "*".to_string(),
        Token::Slash => "/".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(row: usize, col: usize) -> Coord {
        Coord::new(row, col)
    }

    #[test]
    fn test_parse_bare_number() {
        let expr = parse("=42").unwrap();
        assert_eq!(expr, Expr::Operand(Operand::Literal(42)));
    }

    #[test]
    fn test_parse_bare_reference() {
        let expr = parse("=B1").unwrap();
        assert_eq!(expr, Expr::Operand(Operand::Ref(coord(0, 1))));
    }

    #[test]
    fn test_parse_each_operator() {
        for (text, op) in [
            ("=A1+1", Op::Add),
            ("=A1-1", Op::Sub),
            ("=A1*1", Op::Mul),
            ("=A1/1", Op::Div),
        ] {
            let expr = parse(text).unwrap();
            match expr {
                Expr::Binary { op: parsed, .. } => assert_eq!(parsed, op),
                other => panic!("expected Binary for {text}, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_parse_two_references() {
        let expr = parse("=A1+B2").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: Op::Add,
                left: Operand::Ref(coord(0, 0)),
                right: Operand::Ref(coord(1, 1)),
            }
        );
    }

    #[test]
    fn test_whitespace_is_insignificant() {
        assert_eq!(parse("=A1 + B1").unwrap(), parse("=A1+B1").unwrap());
        assert_eq!(parse("=  C1 *2 ").unwrap(), parse("=C1*2").unwrap());
        assert_eq!(parse("=\tA1\t-\t1").unwrap(), parse("=A1-1").unwrap());
    }

    #[test]
    fn test_references_are_case_insensitive() {
        assert_eq!(parse("=c2-1").unwrap(), parse("=C2-1").unwrap());
        assert_eq!(parse("=aa10").unwrap(), parse("=AA10").unwrap());
    }

    #[test]
    fn test_multi_letter_reference() {
        let expr = parse("=AB3").unwrap();
        assert_eq!(expr, Expr::Operand(Operand::Ref(coord(2, 27))));
    }

    #[test]
    fn test_missing_marker_rejected() {
        assert!(parse("A1+1").is_err());
    }

    #[test]
    fn test_empty_formula_rejected() {
        assert!(parse("=").is_err());
        assert!(parse("=   ").is_err());
    }

    #[test]
    fn test_chained_operations_rejected() {
        assert!(parse("=1+2+3").is_err());
        assert!(parse("=A1+B1*2").is_err());
    }

    #[test]
    fn test_missing_operand_rejected() {
        assert!(parse("=A1+").is_err());
        assert!(parse("=+1").is_err());
        assert!(parse("=-1").is_err());
        assert!(parse("=*").is_err());
    }

    #[test]
    fn test_adjacent_operands_rejected() {
        assert!(parse("=1 2").is_err());
        assert!(parse("=A1 B1").is_err());
    }

    #[test]
    fn test_malformed_reference_rejected() {
        assert!(parse("=A0+1").is_err());
        assert!(parse("=A1B+1").is_err());
        assert!(parse("=ABC").is_err());
    }

    #[test]
    fn test_unknown_characters_rejected() {
        assert!(parse("=1.5").is_err());
        assert!(parse("=A1%2").is_err());
        assert!(parse("=(A1)").is_err());
        assert!(parse("=\"x\"").is_err());
    }

    #[test]
    fn test_integer_overflow_rejected() {
        assert!(parse("=99999999999999999999").is_err());
    }

    #[test]
    fn test_number_plus_number() {
        let expr = parse("=1+2").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: Op::Add,
                left: Operand::Literal(1),
                right: Operand::Literal(2),
            }
        );
    }
}
