//! Conservative whitespace and comment minifier for emitted JavaScript.
//!
//! Production library output runs through this pass instead of a full
//! renaming minifier. The transformation is lossless: comments are
//! stripped, horizontal whitespace runs collapse to a single space,
//! indentation and blank lines are dropped, and line breaks are kept so
//! statement boundaries that rely on them survive. String, template
//! literal, and regular expression contents are copied verbatim.
//!
//! Limitation shared with every scanner of this kind: a regular
//! expression literal directly after `)` or `]` is read as division, so
//! comment-like sequences inside such a literal are not protected. The
//! scanner errs toward reading `/` as a regular expression everywhere
//! else, which degrades to copying the input unchanged.

/// Keywords after which a `/` starts a regular expression literal.
const REGEX_PRECEDING_KEYWORDS: &[&str] = &[
    "return",
    "throw",
    "new",
    "in",
    "of",
    "typeof",
    "instanceof",
    "void",
    "delete",
    "case",
    "do",
    "else",
    "yield",
    "await",
];

/// Separator owed to the output before the next significant character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    None,
    Space,
    Newline,
}

/// Scanner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    /// Plain code. The brace count tracks nesting inside a template
    /// interpolation so the matching close brace returns to the template.
    Code { braces: u32 },
    /// Inside a template literal, copied verbatim.
    Template,
}

struct Minifier<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    out: String,
    pending: Pending,
    /// Last significant character written in code state
    last_significant: Option<char>,
    /// Trailing identifier characters of the output, for keyword checks
    last_word: String,
    current: Scan,
    stack: Vec<Scan>,
}

/// Minify JavaScript source without changing its meaning.
///
/// # Examples
///
/// ```
/// use distshape::minify::minify_js;
///
/// let out = minify_js("function f() {\n    return 1; // answer\n}\n");
/// assert_eq!(out, "function f() {\nreturn 1;\n}");
/// ```
pub fn minify_js(source: &str) -> String {
    Minifier::new(source).run()
}

impl<'a> Minifier<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            out: String::with_capacity(source.len()),
            pending: Pending::None,
            last_significant: None,
            last_word: String::new(),
            current: Scan::Code { braces: 0 },
            stack: Vec::new(),
        }
    }

    fn run(mut self) -> String {
        while let Some(c) = self.chars.next() {
            match self.current {
                Scan::Template => self.template_char(c),
                Scan::Code { .. } => self.code_char(c),
            }
        }
        self.out
    }

    fn code_char(&mut self, c: char) {
        match c {
            '"' | '\'' => self.copy_string(c),
            '`' => {
                self.flush_pending();
                self.out.push('`');
                self.stack.push(self.current);
                self.current = Scan::Template;
                self.last_significant = Some('`');
                self.last_word.clear();
            }
            '/' => match self.chars.peek() {
                Some('/') => self.skip_line_comment(),
                Some('*') => self.skip_block_comment(),
                _ => {
                    if self.regex_allowed() {
                        self.copy_regex();
                    } else {
                        self.emit(c);
                    }
                }
            },
            '{' => {
                if let Scan::Code { braces } = self.current {
                    self.current = Scan::Code { braces: braces + 1 };
                }
                self.emit(c);
            }
            '}' => match self.current {
                Scan::Code { braces: 0 } if !self.stack.is_empty() => {
                    self.emit(c);
                    self.current = self.stack.pop().unwrap_or(Scan::Code { braces: 0 });
                }
                Scan::Code { braces } if braces > 0 => {
                    self.current = Scan::Code { braces: braces - 1 };
                    self.emit(c);
                }
                _ => self.emit(c),
            },
            '\n' | '\r' | '\u{2028}' | '\u{2029}' => {
                self.pending = Pending::Newline;
            }
            c if c.is_whitespace() => {
                if self.pending == Pending::None {
                    self.pending = Pending::Space;
                }
            }
            _ => self.emit(c),
        }
    }

    fn template_char(&mut self, c: char) {
        self.out.push(c);
        match c {
            '\\' => {
                if let Some(next) = self.chars.next() {
                    self.out.push(next);
                }
            }
            '`' => {
                self.current = self.stack.pop().unwrap_or(Scan::Code { braces: 0 });
                self.last_significant = Some('`');
                self.last_word.clear();
            }
            '$' => {
                if self.chars.peek() == Some(&'{') {
                    self.chars.next();
                    self.out.push('{');
                    self.stack.push(Scan::Template);
                    self.current = Scan::Code { braces: 0 };
                    self.pending = Pending::None;
                    self.last_significant = Some('{');
                    self.last_word.clear();
                }
            }
            _ => {}
        }
    }

    fn emit(&mut self, c: char) {
        self.flush_pending();
        self.out.push(c);
        self.last_significant = Some(c);
        if c.is_alphanumeric() || c == '_' || c == '$' {
            self.last_word.push(c);
        } else {
            self.last_word.clear();
        }
    }

    fn flush_pending(&mut self) {
        match self.pending {
            Pending::Newline if !self.out.is_empty() => self.out.push('\n'),
            Pending::Space if !self.out.is_empty() => self.out.push(' '),
            _ => {}
        }
        self.pending = Pending::None;
    }

    fn skip_line_comment(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                break;
            }
            self.chars.next();
        }
    }

    fn skip_block_comment(&mut self) {
        self.chars.next();
        let mut saw_newline = false;
        let mut prev_star = false;
        while let Some(c) = self.chars.next() {
            if c == '\n' || c == '\r' {
                saw_newline = true;
            }
            if prev_star && c == '/' {
                break;
            }
            prev_star = c == '*';
        }
        // A comment spanning lines acts as a line break for the code
        // around it; an inline comment separates tokens like a space.
        if saw_newline {
            self.pending = Pending::Newline;
        } else if self.pending == Pending::None {
            self.pending = Pending::Space;
        }
    }

    fn copy_string(&mut self, quote: char) {
        self.flush_pending();
        self.out.push(quote);
        while let Some(c) = self.chars.next() {
            self.out.push(c);
            if c == '\\' {
                if let Some(next) = self.chars.next() {
                    self.out.push(next);
                }
            } else if c == quote {
                break;
            }
        }
        self.last_significant = Some(quote);
        self.last_word.clear();
    }

    /// Whether a `/` at the current position starts a regular expression.
    fn regex_allowed(&self) -> bool {
        match self.last_significant {
            None => true,
            Some(c) if c.is_alphanumeric() || c == '_' || c == '$' => {
                REGEX_PRECEDING_KEYWORDS.contains(&self.last_word.as_str())
            }
            Some(')') | Some(']') | Some('"') | Some('\'') | Some('`') => false,
            Some(_) => true,
        }
    }

    fn copy_regex(&mut self) {
        self.flush_pending();
        self.out.push('/');
        let mut in_class = false;
        while let Some(&c) = self.chars.peek() {
            // A line break means this was not a regex literal after all;
            // everything consumed so far was copied verbatim.
            if c == '\n' || c == '\r' {
                self.last_significant = Some('/');
                self.last_word.clear();
                return;
            }
            self.chars.next();
            self.out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = self.chars.next() {
                        self.out.push(escaped);
                    }
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => break,
                _ => {}
            }
        }
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() {
                self.out.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        self.last_significant = Some('/');
        self.last_word.clear();
    }
}
