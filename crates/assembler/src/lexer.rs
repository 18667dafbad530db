//! Line tokenizer.
//!
//! Splits one source line into tokens. `[`, `]`, `#`, `!` and `,` are always
//! separate tokens, even when written flush against other text. Leading words
//! ending in `:` are label declarations.

/// A single lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Mnemonic, register, number or label reference.
    Word(String),
    /// `,`
    Comma,
    /// `#`
    Hash,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `!`
    Bang,
}

impl Token {
    /// Source text of the token.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Word(word) => word,
            Self::Comma => ",",
            Self::Hash => "#",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Bang => "!",
        }
    }
}

/// A tokenized source line with its label declarations split off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-indexed line number.
    pub number: usize,
    /// Original text, comment included.
    pub text: String,
    /// Labels declared at the start of the line.
    pub labels: Vec<String>,
    /// Remaining tokens: mnemonic followed by operands.
    pub body: Vec<Token>,
}

impl SourceLine {
    /// Tokenizes `text` and separates leading label declarations.
    #[must_use]
    pub fn parse(text: &str, number: usize) -> Self {
        let mut tokens = tokenize(text).into_iter().peekable();
        let mut labels = Vec::new();
        while let Some(Token::Word(word)) = tokens.peek() {
            let Some(name) = word.strip_suffix(':') else {
                break;
            };
            labels.push(name.to_string());
            tokens.next();
        }
        Self {
            number,
            text: text.to_string(),
            labels,
            body: tokens.collect(),
        }
    }

    /// The line holds an instruction or directive.
    #[must_use]
    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }
}

/// Removes a trailing `//` comment.
#[must_use]
pub fn strip_comment(line: &str) -> &str {
    line.find("//").map_or(line, |pos| &line[..pos])
}

/// Splits a line into tokens, dropping comments and whitespace.
#[must_use]
pub fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for ch in strip_comment(line).chars() {
        let punct = match ch {
            ',' => Some(Token::Comma),
            '#' => Some(Token::Hash),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            '!' => Some(Token::Bang),
            c if c.is_whitespace() => None,
            c => {
                current.push(c);
                continue;
            }
        };
        if !current.is_empty() {
            tokens.push(Token::Word(std::mem::take(&mut current)));
        }
        tokens.extend(punct);
    }

    if !current.is_empty() {
        tokens.push(Token::Word(current));
    }
    tokens
}

/// Returns `true` when `name` is usable as a label.
#[must_use]
pub fn is_valid_label(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_' || first == '.')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}
