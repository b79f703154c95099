use colored::*;
use regex::Regex;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

/// Renders a complete markdown answer for the terminal: fenced code is
/// syntax highlighted, headings and `**bold**` spans are emphasised.
pub struct AnswerRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    bold: Option<Regex>,
    width: usize,
}

impl AnswerRenderer {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            bold: Regex::new(r"\*\*([^*]+)\*\*").ok(),
            width: super::output::terminal_width().min(80),
        }
    }

    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let Some(theme) = self.theme_set.themes.get("Solarized (dark)") else {
            return code.to_string();
        };

        let syntax = lang
            .and_then(|lang| {
                self.syntax_set
                    .find_syntax_by_token(lang)
                    .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            })
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut output = String::new();

        for line in LinesWithEndings::from(code) {
            match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => {
                    let ranges: Vec<(Style, &str)> = ranges;
                    output.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
                }
                Err(_) => output.push_str(line),
            }
        }

        // Reset colors so prose after the block is not tinted
        output.push_str("\x1b[0m");
        output
    }

    fn render_prose_line(&self, line: &str) -> String {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') {
            let heading = trimmed.trim_start_matches('#').trim();
            return heading.bold().cyan().to_string();
        }

        match &self.bold {
            Some(re) => re
                .replace_all(line, |caps: &regex::Captures| caps[1].bold().to_string())
                .into_owned(),
            None => line.to_string(),
        }
    }

    pub fn render(&self, text: &str) -> String {
        let mut output = String::new();
        let mut code: Option<(Option<String>, String)> = None;

        for line in text.lines() {
            let fence = line.trim_start().starts_with("```");
            if fence {
                match code.take() {
                    Some((lang, body)) => {
                        output.push_str(&self.highlight_code(&body, lang.as_deref()));
                        output.push_str(&format!(
                            "{}\n",
                            format!("└{}", "─".repeat(self.width.saturating_sub(1))).dimmed()
                        ));
                    }
                    None => {
                        let lang = line.trim_start().trim_start_matches('`').trim();
                        let lang = (!lang.is_empty()).then(|| lang.to_string());
                        output.push_str(&format!(
                            "{}[{}]{}\n",
                            "┌─".dimmed(),
                            lang.as_deref().unwrap_or("code").cyan(),
                            "─".repeat(self.width.saturating_sub(10)).dimmed()
                        ));
                        code = Some((lang, String::new()));
                    }
                }
            } else if let Some((_, body)) = code.as_mut() {
                body.push_str(line);
                body.push('\n');
            } else {
                output.push_str(&self.render_prose_line(line));
                output.push('\n');
            }
        }

        // Unterminated fence: show what arrived
        if let Some((lang, body)) = code {
            output.push_str(&self.highlight_code(&body, lang.as_deref()));
        }

        output
    }
}

impl Default for AnswerRenderer {
    fn default() -> Self {
        Self::new()
    }
}
