use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

use super::tokenize;
use crate::{ParserConfig, Token, TokenizerFactory};

/// Strips a string down to characters with no special class under the
/// default dialect, so fields survive tokenization byte-for-byte.
fn plain(s: &str) -> String {
    s.chars().filter(char::is_ascii_alphanumeric).collect()
}

#[quickcheck]
fn plain_fields_round_trip(raw: Vec<String>) -> TestResult {
    let values: Vec<String> = raw
        .iter()
        .map(|s| plain(s))
        .filter(|s| !s.is_empty())
        .collect();
    if values.is_empty() {
        return TestResult::discard();
    }

    let input = format!("{}\n", values.join(","));
    let tokens = tokenize(&input, ParserConfig::default()).unwrap();
    let fields: Vec<String> = tokens
        .into_iter()
        .filter(|(token, _)| *token == Token::Field)
        .map(|(_, value)| value.unwrap_or_default())
        .collect();
    TestResult::from_bool(fields == values)
}

/// Token kinds from a skip traversal match a read traversal exactly; only
/// the materialized values differ.
#[quickcheck]
fn skip_and_read_agree_on_token_kinds(raw: String) -> bool {
    // Fold arbitrary input onto the interesting alphabet so the quoting and
    // trimming paths actually get exercised.
    let alphabet = ['a', 'b', '"', ',', '\n', ' '];
    let input: String = raw
        .chars()
        .map(|c| alphabet[c as usize % alphabet.len()])
        .collect();

    run(&input, true) == run(&input, false)
}

fn run(input: &str, read: bool) -> (Vec<Token>, bool) {
    let config = ParserConfig {
        lazy_quotes: true,
        ..ParserConfig::default()
    };
    let factory = TokenizerFactory::new(config).unwrap();
    let mut tokenizer = factory.tokenizer(input.as_bytes());
    let mut tokens = Vec::new();
    loop {
        let result = if read {
            tokenizer.next_token()
        } else {
            tokenizer.skip_token()
        };
        match result {
            Ok(Token::EndOfData) => {
                tokens.push(Token::EndOfData);
                return (tokens, false);
            }
            Ok(token) => tokens.push(token),
            Err(_) => return (tokens, true),
        }
    }
}
