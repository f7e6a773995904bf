//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use super::ast::{BinaryOp, Expr, Postfix, UnaryOp};
use super::lexer::{lex, Token};
use super::{EvalError, Value};

/// Parse expression source into an AST
pub fn parse(input: &str) -> Result<Expr, EvalError> {
    let len = input.len();
    let tokens = lex(input)?;

    let token_iter = tokens
        .into_iter()
        .map(|(tok, span)| (tok, SimpleSpan::from(span)));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream =
        Stream::from_iter(token_iter).map((len..len).into(), |(t, s): (_, _)| (t, s));

    expr_parser()
        .then_ignore(end())
        .parse(token_stream)
        .into_result()
        .map_err(|errs| EvalError::Syntax(describe_errors(&errs)))
}

fn describe_errors(errors: &[Rich<'_, Token>]) -> String {
    errors
        .iter()
        .map(|err| {
            let found = match err.found() {
                Some(tok) => tok.to_string(),
                None => "end of input".to_string(),
            };
            format!("unexpected {} at {}", found, err.span().into_range().start)
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn binary(lhs: Expr, (op, rhs): (BinaryOp, Expr)) -> Expr {
    Expr::Binary(op, Box::new(lhs), Box::new(rhs))
}

fn expr_parser<'a, I>() -> impl Parser<'a, I, Expr, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|expr| {
        let literal = select! {
            Token::Int(n) => Value::Int(n),
            Token::Float(x) => Value::Float(x),
            Token::Str(s) => Value::Str(s),
            Token::True => Value::Bool(true),
            Token::False => Value::Bool(false),
            Token::Null => Value::Null,
        }
        .map(Expr::Literal);

        let name = select! {
            Token::Ident(s) => s,
        };

        let items = expr
            .clone()
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>();

        let atom = choice((
            literal,
            name.clone().map(Expr::Name),
            items
                .clone()
                .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
                .map(Expr::List),
            expr.clone()
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
        ));

        // `.member`, `[index]` and `(args)` bind tightest, left to right
        let postfix = choice((
            just(Token::Dot).ignore_then(name).map(Postfix::Member),
            expr.clone()
                .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
                .map(Postfix::Index),
            items
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
                .map(Postfix::Call),
        ));

        let access = atom
            .foldl(postfix.repeated(), |target, op| op.apply(target))
            .boxed();

        let negation = just(Token::Minus)
            .to(UnaryOp::Neg)
            .repeated()
            .foldr(access, |op, operand| Expr::Unary(op, Box::new(operand)))
            .boxed();

        let product = negation
            .clone()
            .foldl(
                choice((
                    just(Token::Star).to(BinaryOp::Mul),
                    just(Token::Slash).to(BinaryOp::Div),
                    just(Token::Percent).to(BinaryOp::Rem),
                ))
                .then(negation)
                .repeated(),
                binary,
            )
            .boxed();

        let sum = product
            .clone()
            .foldl(
                choice((
                    just(Token::Plus).to(BinaryOp::Add),
                    just(Token::Minus).to(BinaryOp::Sub),
                ))
                .then(product)
                .repeated(),
                binary,
            )
            .boxed();

        let comparison = sum
            .clone()
            .foldl(
                choice((
                    just(Token::EqualEqual).to(BinaryOp::Eq),
                    just(Token::NotEqual).to(BinaryOp::Ne),
                    just(Token::LessOrEqual).to(BinaryOp::Le),
                    just(Token::GreaterOrEqual).to(BinaryOp::Ge),
                    just(Token::Less).to(BinaryOp::Lt),
                    just(Token::Greater).to(BinaryOp::Gt),
                ))
                .then(sum)
                .repeated(),
                binary,
            )
            .boxed();

        // `not` sits below comparisons so `not a == b` reads as `not (a == b)`
        let inversion = just(Token::Not)
            .to(UnaryOp::Not)
            .repeated()
            .foldr(comparison, |op, operand| Expr::Unary(op, Box::new(operand)))
            .boxed();

        let conjunction = inversion
            .clone()
            .foldl(
                just(Token::And).to(BinaryOp::And).then(inversion).repeated(),
                binary,
            )
            .boxed();

        conjunction
            .clone()
            .foldl(
                just(Token::Or).to(BinaryOp::Or).then(conjunction).repeated(),
                binary,
            )
            .boxed()
    })
}
