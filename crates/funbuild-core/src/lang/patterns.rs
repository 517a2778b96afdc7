//! Source patterns used by the extractors.

use std::sync::OnceLock;

use regex::Regex;

/// Grouped Go import block; captures the lines between the parentheses.
pub const GO_IMPORT_BLOCK: &str = r"(?m)^import\s*\(\r?\n([\s\S]*?)\r?\n\)";

/// Single-line Go import; captures the quoted path.
pub const GO_IMPORT_LINE: &str = r#"(?m)^import[ \t]*("[^"\r\n]*")[ \t\r]*$"#;

/// Top-level exported Go function header; captures the name.
pub const GO_FUNCTION_NAME: &str = r"(?m)^func ([A-Z]\w*)\(.*\)";

/// Top-level Go function from `func` through a line holding only `}`.
pub const GO_FUNCTION_CONTENT: &str = r"(?m)^func [\s\S]*?\n\}[ \t\r]*$";

/// Python function header; captures the name.
pub const PYTHON_FUNCTION_NAME: &str = r"def ([a-zA-Z_]\w*)\(.*\)";

/// Compiled Go patterns.
pub struct GoPatterns {
    pub import_block: Regex,
    pub import_line: Regex,
    pub function_name: Regex,
    pub function_content: Regex,
}

static GO_PATTERNS: OnceLock<GoPatterns> = OnceLock::new();
static PYTHON_FUNCTION: OnceLock<Regex> = OnceLock::new();

pub fn go_patterns() -> &'static GoPatterns {
    GO_PATTERNS.get_or_init(|| GoPatterns {
        import_block: Regex::new(GO_IMPORT_BLOCK).expect("Invalid Go import block pattern"),
        import_line: Regex::new(GO_IMPORT_LINE).expect("Invalid Go import pattern"),
        function_name: Regex::new(GO_FUNCTION_NAME).expect("Invalid Go function name pattern"),
        function_content: Regex::new(GO_FUNCTION_CONTENT)
            .expect("Invalid Go function content pattern"),
    })
}

pub fn python_function_name() -> &'static Regex {
    PYTHON_FUNCTION
        .get_or_init(|| Regex::new(PYTHON_FUNCTION_NAME).expect("Invalid Python function pattern"))
}
