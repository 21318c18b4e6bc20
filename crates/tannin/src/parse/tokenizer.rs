//! Single-pass template tokenization.
//!
//! The raw template text is split once into literal text, `{directive}`
//! tokens, and `{$interpolation}` tokens. Brace pairs that are neither — CSS
//! blocks, JavaScript objects, plain prose — pass through as literal text, so
//! only the fixed directive vocabulary is ever interpreted.

/// A directive keyword. A `{...}` body is a directive only when it starts
/// with one of these followed by a non-word character or the end of the body.
const DIRECTIVE_KEYWORDS: &[&str] = &[
    "extends", "block", "endblock", "include", "if", "elseif", "else", "endif", "/if", "loop",
    "for", "endloop", "endfor", "/loop", "/for", "switch", "case", "default", "endswitch",
    "/switch", "endcase", "/case",
];

/// One lexical unit of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Literal output text, including `{...}` runs that are not directives.
    Text(&'a str),
    /// `{$...}` interpolation body, without the braces or the leading `$`.
    Interp(&'a str),
    /// `{...}` directive body, trimmed.
    Directive(&'a str),
}

/// Splits a directive body into its keyword and the rest.
pub fn split_directive(body: &str) -> (&str, &str) {
    let end = body
        .find(|c: char| !c.is_ascii_alphabetic() && c != '/')
        .unwrap_or(body.len());
    (&body[..end], body[end..].trim())
}

fn is_directive(body: &str) -> bool {
    let (keyword, _) = split_directive(body);
    DIRECTIVE_KEYWORDS.contains(&keyword)
}

/// Tokenizer over template text.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Finds the `}` closing a brace opened at `open`, ignoring `}` inside
    /// double-quoted strings.
    fn find_close(&self, open: usize) -> Option<usize> {
        let mut in_string = false;
        let mut escaped = false;
        for (i, ch) in self.input[open + 1..].char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match ch {
                '\\' => escaped = true,
                '"' => in_string = !in_string,
                '}' if !in_string => return Some(open + 1 + i),
                _ => {}
            }
        }
        None
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }
        let remaining = &self.input[self.pos..];

        let Some(brace) = remaining.find('{') else {
            self.pos = self.input.len();
            return Some(Token::Text(remaining));
        };
        if brace > 0 {
            self.pos += brace;
            return Some(Token::Text(&remaining[..brace]));
        }

        let open = self.pos;
        let Some(close) = self.find_close(open) else {
            // No closing brace: the rest is literal.
            self.pos = self.input.len();
            return Some(Token::Text(remaining));
        };

        let body = self.input[open + 1..close].trim();
        self.pos = close + 1;

        if let Some(interp) = body.strip_prefix('$') {
            Some(Token::Interp(interp))
        } else if is_directive(body) {
            Some(Token::Directive(body))
        } else {
            // Not template syntax: emit the braces and body verbatim.
            Some(Token::Text(&self.input[open..=close]))
        }
    }
}
