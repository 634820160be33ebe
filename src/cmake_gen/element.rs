//! Build-graph elements and their `CMake` text form.

use camino::Utf8PathBuf;
use itertools::Itertools;
use std::fmt::{self, Display, Formatter};

const INDENT: &str = "    ";

/// One statement of the generated build script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildGraphElement {
    /// A `#` comment line.
    Comment(String),
    /// Include directories applied to every target.
    IncludeDirectories(Vec<Utf8PathBuf>),
    /// A compiled but unlinked unit.
    ObjectLibrary {
        /// Target name.
        name: String,
        /// Sources compiled into the library.
        sources: Vec<Utf8PathBuf>,
    },
    /// The final linked artefact.
    Executable {
        /// Target name.
        name: String,
        /// Libraries linked into the executable.
        libraries: Vec<String>,
    },
    /// A named convenience target.
    CustomTarget {
        /// Target name.
        name: String,
        /// Message shown when the target runs.
        description: String,
        /// File dependencies.
        depends: Vec<String>,
        /// Targets that must be built first.
        target_depends: Vec<String>,
    },
}

impl BuildGraphElement {
    /// Name of the target this element declares, if any.
    #[must_use]
    pub fn target_name(&self) -> Option<&str> {
        match self {
            Self::ObjectLibrary { name, .. }
            | Self::Executable { name, .. }
            | Self::CustomTarget { name, .. } => Some(name),
            Self::Comment(_) | Self::IncludeDirectories(_) => None,
        }
    }
}

/// Quote a `CMake` argument when it would otherwise be split or misread.
fn cmake_arg(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | ';' | '(' | ')' | '#' | '\\'));
    if needs_quotes {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_owned()
    }
}

/// Render a path with forward slashes so scripts look the same on every host.
fn cmake_path(path: &Utf8PathBuf) -> String {
    cmake_arg(&path.as_str().replace('\\', "/"))
}

fn write_block<I, S>(f: &mut Formatter<'_>, items: I) -> fmt::Result
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for item in items {
        writeln!(f, "{INDENT}{}", item.as_ref())?;
    }
    Ok(())
}

impl Display for BuildGraphElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comment(text) => {
                for line in text.lines() {
                    writeln!(f, "# {line}")?;
                }
                Ok(())
            }
            Self::IncludeDirectories(dirs) => {
                writeln!(f, "include_directories(")?;
                write_block(f, dirs.iter().map(cmake_path))?;
                writeln!(f, ")")
            }
            Self::ObjectLibrary { name, sources } => {
                writeln!(f, "add_library({} OBJECT", cmake_arg(name))?;
                write_block(f, sources.iter().map(cmake_path))?;
                writeln!(f, ")")
            }
            Self::Executable { name, libraries } => {
                let name = cmake_arg(name);
                writeln!(f, "add_executable({name})")?;
                if !libraries.is_empty() {
                    writeln!(f, "target_link_libraries({name}")?;
                    write_block(f, libraries.iter().map(|l| cmake_arg(l)))?;
                    writeln!(f, ")")?;
                }
                Ok(())
            }
            Self::CustomTarget {
                name,
                description,
                depends,
                target_depends,
            } => {
                let name = cmake_arg(name);
                writeln!(f, "add_custom_target({name}")?;
                writeln!(f, "{INDENT}COMMENT {}", cmake_arg(description))?;
                if !depends.is_empty() {
                    writeln!(
                        f,
                        "{INDENT}DEPENDS {}",
                        depends.iter().map(|d| cmake_arg(d)).join(" ")
                    )?;
                }
                writeln!(f, ")")?;
                if !target_depends.is_empty() {
                    writeln!(
                        f,
                        "add_dependencies({name} {})",
                        target_depends.iter().map(|d| cmake_arg(d)).join(" ")
                    )?;
                }
                Ok(())
            }
        }
    }
}

/// Serialise elements into a build script, one blank line between elements.
#[must_use]
pub fn render(elements: &[BuildGraphElement]) -> String {
    elements.iter().map(ToString::to_string).join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("plain", "plain")]
    #[case("${PROJECT_NAME}", "${PROJECT_NAME}")]
    #[case("with space", "\"with space\"")]
    #[case("Build variant V", "\"Build variant V\"")]
    #[case("a;b", "\"a;b\"")]
    #[case("say \"hi\"", "\"say \\\"hi\\\"\"")]
    #[case("", "\"\"")]
    fn quotes_only_when_needed(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(cmake_arg(raw), expected);
    }

    #[rstest]
    fn renders_object_library() {
        let element = BuildGraphElement::ObjectLibrary {
            name: "math".into(),
            sources: vec!["/p/math/a.c".into(), "/p/my dir/b.c".into()],
        };
        assert_eq!(
            element.to_string(),
            "add_library(math OBJECT\n    /p/math/a.c\n    \"/p/my dir/b.c\"\n)\n"
        );
    }

    #[rstest]
    fn renders_custom_target_with_dependencies() {
        let element = BuildGraphElement::CustomTarget {
            name: "compile-V-math".into(),
            description: "Compile component math".into(),
            depends: vec!["stamp.txt".into()],
            target_depends: vec!["math".into()],
        };
        assert_eq!(
            element.to_string(),
            concat!(
                "add_custom_target(compile-V-math\n",
                "    COMMENT \"Compile component math\"\n",
                "    DEPENDS stamp.txt\n",
                ")\n",
                "add_dependencies(compile-V-math math)\n",
            )
        );
    }

    #[rstest]
    fn renders_executable_without_libraries() {
        let element = BuildGraphElement::Executable {
            name: "${PROJECT_NAME}".into(),
            libraries: Vec::new(),
        };
        assert_eq!(element.to_string(), "add_executable(${PROJECT_NAME})\n");
    }

    #[rstest]
    fn renders_multiline_comment() {
        let element = BuildGraphElement::Comment("first\nsecond".into());
        assert_eq!(element.to_string(), "# first\n# second\n");
    }

    #[rstest]
    fn render_separates_elements() {
        let elements = vec![
            BuildGraphElement::Comment("header".into()),
            BuildGraphElement::IncludeDirectories(vec!["/p/app".into()]),
        ];
        assert_eq!(
            render(&elements),
            "# header\n\ninclude_directories(\n    /p/app\n)\n"
        );
        assert_eq!(render(&[]), "");
    }
}
