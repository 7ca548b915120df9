//! Chumsky recognisers for scalar and directive syntax
//!
//! These parsers only decide whether a token has a given shape; numeric
//! conversion happens in the scalar decoder once a shape is recognised.

use chumsky::prelude::*;

/// A single ASCII decimal digit.
fn digit<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    one_of('0'..='9').ignored()
}

/// Optional leading `+` or `-`.
fn sign<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    one_of("+-").or_not().ignored()
}

/// A digit followed by any run of digits and `_` separators.
fn separated_digits<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    digit()
        .then(digit().or(just('_').ignored()).repeated())
        .ignored()
}

/// Decimal float: `1.`, `1.5`, `.5`, `1_000.25e+3`.
///
/// The exponent sign is mandatory, as in the YAML 1.1 float schema.
pub fn float_literal<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    let whole = separated_digits()
        .then(just('.'))
        .then(digit().repeated())
        .ignored();
    let fraction_only = just('.').then(digit().repeated().at_least(1)).ignored();
    let exponent = one_of("eE")
        .then(one_of("+-"))
        .then(digit().repeated().at_least(1))
        .ignored();

    sign()
        .then(whole.or(fraction_only))
        .then(exponent.or_not())
        .then_ignore(end())
        .ignored()
}

/// Base-60 number: `1:30`, `-190:20:30`, `1:30.5`.
pub fn sexagesimal_literal<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    // Two-digit form first so `5` followed by `:` can still fall back to one digit
    let group = one_of('0'..='5').then(digit()).ignored().or(digit());
    let fraction = just('.')
        .then(digit().or(just('_').ignored()).repeated())
        .ignored();

    sign()
        .then(separated_digits())
        .then(just(':').then(group).repeated().at_least(1))
        .then(fraction.or_not())
        .then_ignore(end())
        .ignored()
}

/// Directive line: `%NAME arguments`, yielding the name and raw arguments.
pub fn directive_line<'src>() -> impl Parser<'src, &'src str, (String, String)> + Clone {
    just('%')
        .ignore_then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric())
                .repeated()
                .at_least(1)
                .collect::<String>(),
        )
        .then(any().repeated().collect::<String>())
        .then_ignore(end())
}

/// Whether `text` is a float literal.
pub fn is_float(text: &str) -> bool {
    float_literal().parse(text).into_result().is_ok()
}

/// Whether `text` is a sexagesimal literal.
pub fn is_sexagesimal(text: &str) -> bool {
    sexagesimal_literal().parse(text).into_result().is_ok()
}

/// Split a directive line into its name and trimmed arguments.
pub fn parse_directive(line: &str) -> Option<(String, String)> {
    directive_line()
        .parse(line)
        .into_result()
        .ok()
        .map(|(name, args)| (name, args.trim().to_string()))
}
