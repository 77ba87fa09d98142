use nu_ansi_term::{Color, Style};
use plang_core::lexer::{self, Token, TokenKind};
use reedline::StyledText;

const DEFAULT: Color = Color::White;

/// Colors REPL input by token kind using the language's own lexer.
pub struct Highlighter;

fn is_operator(text: &str) -> bool {
    text.chars().all(|c| "+-*/%!^&|~=:?<>".contains(c))
}

fn color(token: &Token, next: Option<&Token>) -> Color {
    match token.kind {
        TokenKind::Comment => Color::DarkGray,
        TokenKind::PreprocessorCommand | TokenKind::PreprocessorArgument => Color::Magenta,
        TokenKind::Number => Color::Cyan,
        TokenKind::String => Color::Green,
        TokenKind::Identifier if is_operator(&token.text) => DEFAULT,
        TokenKind::Identifier => match next.map(|t| t.kind) {
            Some(TokenKind::RegionOpen(lexer::Region::Tuple)) => Color::Blue,
            _ => Color::Red,
        },
        _ => DEFAULT,
    }
}

impl reedline::Highlighter for Highlighter {
    fn highlight(&self, line: &str, _: usize) -> StyledText {
        let mut output = StyledText::new();

        let Ok(tokens) = lexer::tokenize(line) else {
            output.push((Style::new().fg(DEFAULT), line.to_string()));
            return output;
        };

        let mut cursor = 0;
        for (i, token) in tokens.iter().enumerate() {
            let range = token.span.0.clone();
            // Whitespace between tokens, and the `#` a directive token drops.
            if range.start > cursor {
                output.push((Style::new().fg(DEFAULT), line[cursor..range.start].to_string()));
            }
            let fg = color(token, tokens.get(i + 1));
            output.push((Style::new().fg(fg), line[range.clone()].to_string()));
            cursor = cursor.max(range.end);
        }
        if cursor < line.len() {
            output.push((Style::new().fg(DEFAULT), line[cursor..].to_string()));
        }

        output
    }
}
