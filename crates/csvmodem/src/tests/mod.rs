mod property_roundtrip;

use crate::{Error, ParserConfig, Token, TokenizerFactory};

/// Tokenizes `input` to completion, pairing each token with the value
/// visible immediately after it.
fn tokenize(
    input: &str,
    config: ParserConfig,
) -> Result<Vec<(Token, Option<String>)>, Error> {
    let factory = TokenizerFactory::new(config)?;
    let mut tokenizer = factory.tokenizer(input.as_bytes());
    let mut out = Vec::new();
    loop {
        let token = tokenizer.next_token()?;
        let value = tokenizer.value().map(str::to_string);
        out.push((token, value));
        if token == Token::EndOfData {
            return Ok(out);
        }
    }
}

fn kinds(input: &str, config: ParserConfig) -> Vec<Token> {
    tokenize(input, config)
        .unwrap()
        .into_iter()
        .map(|(token, _)| token)
        .collect()
}

fn fields(input: &str, config: ParserConfig) -> Vec<String> {
    tokenize(input, config)
        .unwrap()
        .into_iter()
        .filter(|(token, _)| *token == Token::Field)
        .map(|(_, value)| value.unwrap_or_default())
        .collect()
}
