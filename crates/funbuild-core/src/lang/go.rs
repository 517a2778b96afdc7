//! Go plugin source extraction.
//!
//! The whole file is scanned with the patterns in [`super::patterns`]:
//! grouped and single-line imports, exported function names, and the full
//! text of every top-level function except `main`.

use std::path::Path;

use tracing::{debug, error, info};

use super::Extractor;
use super::patterns::go_patterns;
use crate::dialect::{Dialect, FUNGO_IMPORT};
use crate::error::{BuildError, Result};
use crate::unit::ExtractedUnit;

/// Pattern-based extractor for Go plugin sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoExtractor;

impl GoExtractor {
    /// Extract imports, function names and function bodies from Go source.
    pub fn extract(source: &str) -> ExtractedUnit {
        let patterns = go_patterns();
        let mut unit = ExtractedUnit::new(FUNGO_IMPORT);

        for block in patterns.import_block.captures_iter(source) {
            unit.imports.extend(
                block[1]
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(String::from),
            );
        }

        // Single-line imports are collected independently of the blocks
        for import in patterns.import_line.captures_iter(source) {
            unit.imports.push(import[1].trim().to_string());
        }

        unit.ensure_plugin_import();

        for header in patterns.function_name.captures_iter(source) {
            let name = header[1].trim();
            if name == "main" {
                continue;
            }
            unit.function_names.push(name.to_string());
        }

        for function in patterns.function_content.find_iter(source) {
            let text = function.as_str();
            if text.contains("func main(") {
                continue;
            }
            unit.function_bodies
                .push(text.trim_matches(['\r', '\n']).to_string());
        }

        debug!(
            imports = unit.imports.len(),
            functions = unit.function_names.len(),
            bodies = unit.function_bodies.len(),
            "Extracted Go declarations"
        );

        unit
    }
}

impl Extractor for GoExtractor {
    fn dialect(&self) -> Dialect {
        Dialect::Go
    }

    fn extract_source(&self, source: &str) -> ExtractedUnit {
        Self::extract(source)
    }

    fn extract_file(&self, path: &Path) -> Result<ExtractedUnit> {
        info!("start to parse {}", path.display());

        let bytes = std::fs::read(path).map_err(|e| {
            error!("Failed to read {}: {}", path.display(), e);
            BuildError::read(path, e)
        })?;

        Ok(Self::extract(&String::from_utf8_lossy(&bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLUGIN: &str = r#"package main

import (
	"fmt"

	"github.com/httprunner/funplugin/fungo"
)

import "strings"

func SumTwoInt(a, b int) int {
	return a + b
}

func helper(s string) string {
	return strings.ToUpper(s)
}

func Concatenate(args ...string) string {
	fmt.Println(len(args))
	return strings.Join(args, "")
}

func main() {
	fungo.Register("SumTwoInt", SumTwoInt)
	fungo.Serve()
}
"#;

    #[test]
    fn test_extract_imports() {
        let unit = GoExtractor::extract(PLUGIN);
        assert_eq!(
            unit.imports,
            vec![
                "\"fmt\"",
                "\"github.com/httprunner/funplugin/fungo\"",
                "\"strings\"",
            ]
        );
        assert!(unit.from_imports.is_empty());
    }

    #[test]
    fn test_extract_function_names_skip_lowercase_and_main() {
        let unit = GoExtractor::extract(PLUGIN);
        assert_eq!(unit.function_names, vec!["SumTwoInt", "Concatenate"]);
    }

    #[test]
    fn test_extract_function_bodies_skip_main() {
        let unit = GoExtractor::extract(PLUGIN);
        assert_eq!(unit.function_bodies.len(), 3);
        assert_eq!(
            unit.function_bodies[0],
            "func SumTwoInt(a, b int) int {\n\treturn a + b\n}"
        );
        assert!(unit.function_bodies[1].starts_with("func helper(s string) string {"));
        assert!(unit.function_bodies[2].ends_with("return strings.Join(args, \"\")\n}"));
        assert!(unit.function_bodies.iter().all(|b| !b.contains("func main(")));
    }

    #[test]
    fn test_add_example() {
        let source = "import (\n\t\"fmt\"\n)\n\nfunc Add(a, b int) int {\n\treturn a+b\n}\n";
        let unit = GoExtractor::extract(source);

        assert_eq!(unit.imports, vec!["\"fmt\"", FUNGO_IMPORT]);
        assert_eq!(unit.function_names, vec!["Add"]);
        assert_eq!(
            unit.function_bodies,
            vec!["func Add(a, b int) int {\n\treturn a+b\n}"]
        );
    }

    #[test]
    fn test_no_imports_still_gets_plugin_import() {
        let unit = GoExtractor::extract("package main\n");
        assert_eq!(unit.imports, vec![FUNGO_IMPORT]);
        assert!(unit.function_names.is_empty());
        assert!(unit.function_bodies.is_empty());
    }

    #[test]
    fn test_names_and_bodies_correspond() {
        let source = "func A() int {\n\treturn 1\n}\n\nfunc B() int {\n\treturn 2\n}\n\nfunc C() int {\n\treturn 3\n}";
        let unit = GoExtractor::extract(source);

        assert_eq!(unit.function_names, vec!["A", "B", "C"]);
        assert_eq!(unit.function_bodies.len(), 3);
        for (name, body) in unit.function_names.iter().zip(&unit.function_bodies) {
            assert!(body.starts_with(&format!("func {name}(")));
        }
    }

    #[test]
    fn test_nested_closing_braces_stay_in_body() {
        let source = "func Loop(n int) int {\n\tfor i := 0; i < n; i++ {\n\t\tif i > 2 {\n\t\t\treturn i\n\t\t}\n\t}\n\treturn n\n}\n";
        let unit = GoExtractor::extract(source);
        assert_eq!(unit.function_bodies, vec![source.trim_end_matches('\n')]);
    }

    #[test]
    fn test_crlf_source_keeps_bodies() {
        let source = PLUGIN.replace('\n', "\r\n");
        let unit = GoExtractor::extract(&source);

        assert_eq!(
            unit.imports,
            vec![
                "\"fmt\"",
                "\"github.com/httprunner/funplugin/fungo\"",
                "\"strings\"",
            ]
        );
        assert_eq!(unit.function_names, vec!["SumTwoInt", "Concatenate"]);
        assert_eq!(unit.function_bodies.len(), 3);
        assert_eq!(
            unit.function_bodies[0],
            "func SumTwoInt(a, b int) int {\r\n\treturn a + b\r\n}"
        );
    }

    #[test]
    fn test_extract_file_accepts_non_utf8_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debugtalk.go");
        std::fs::write(
            &path,
            b"import \"fmt\"\n\n// caf\xe9\nfunc Hello() string {\n\treturn fmt.Sprint(1)\n}\n",
        )
        .unwrap();

        let unit = GoExtractor.extract_file(&path).unwrap();
        assert_eq!(unit.imports, vec!["\"fmt\"", FUNGO_IMPORT]);
        assert_eq!(unit.function_names, vec!["Hello"]);
        assert_eq!(unit.function_bodies.len(), 1);
    }

    #[test]
    fn test_extract_file_missing() {
        let err = GoExtractor
            .extract_file(Path::new("/nonexistent/debugtalk.go"))
            .unwrap_err();
        assert!(matches!(err, BuildError::Read { .. }));
    }
}
