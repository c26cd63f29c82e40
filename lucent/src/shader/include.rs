//! `#include "name"` pre-pass.
//!
//! Include directives are resolved textually against an [`IncludeRegistry`] before the source
//! reaches the driver. An included source may include other sources; an include cycle is an
//! error, as is an unresolved name.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum IncludeError {
  #[error("line {line}: unresolved include {name:?}")]
  Unresolved { name: String, line: usize },

  #[error("line {line}: malformed include directive {directive:?}")]
  Malformed { directive: String, line: usize },

  #[error("recursive include: {}", .chain.join(" -> "))]
  Recursive { chain: Vec<String> },
}

/// Named GLSL snippets available to `#include`.
#[derive(Clone, Debug, Default)]
pub struct IncludeRegistry {
  sources: HashMap<String, String>,
}

impl IncludeRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) -> Option<String> {
    self.sources.insert(name.into(), source.into())
  }

  pub fn remove(&mut self, name: &str) -> Option<String> {
    self.sources.remove(name)
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self.sources.get(name).map(String::as_str)
  }

  pub fn is_empty(&self) -> bool {
    self.sources.is_empty()
  }

  pub fn len(&self) -> usize {
    self.sources.len()
  }

  /// Expand every include directive of `source`.
  pub fn expand(&self, source: &str) -> Result<String, IncludeError> {
    let mut chain = Vec::new();
    self.expand_rec(source, &mut chain)
  }

  fn expand_rec(&self, source: &str, chain: &mut Vec<String>) -> Result<String, IncludeError> {
    let mut out = String::with_capacity(source.len());

    for (i, line) in source.lines().enumerate() {
      match parse_directive(line) {
        None => {
          out.push_str(line);
          out.push('\n');
        }

        Some(Err(())) => {
          return Err(IncludeError::Malformed {
            directive: line.trim().to_owned(),
            line: i + 1,
          })
        }

        Some(Ok(name)) => {
          if chain.iter().any(|n| n == name) {
            let mut chain = chain.clone();
            chain.push(name.to_owned());
            return Err(IncludeError::Recursive { chain });
          }

          let included = self.get(name).ok_or_else(|| IncludeError::Unresolved {
            name: name.to_owned(),
            line: i + 1,
          })?;

          chain.push(name.to_owned());
          let expanded = self.expand_rec(included, chain)?;
          chain.pop();

          out.push_str(&expanded);
        }
      }
    }

    Ok(out)
  }
}

// None if the line isn’t an include directive; Some(Err) if it is one but is ill-formed.
fn parse_directive(line: &str) -> Option<Result<&str, ()>> {
  let rest = line.trim_start().strip_prefix('#')?.trim_start();
  let rest = rest.strip_prefix("include")?;

  if !rest.starts_with(|c: char| c.is_whitespace() || c == '"') {
    return None;
  }

  let rest = rest.trim();
  let name = rest
    .strip_prefix('"')
    .and_then(|r| r.strip_suffix('"'))
    .filter(|name| !name.is_empty() && !name.contains('"'));

  Some(name.ok_or(()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn expands_nested_includes() {
    let mut reg = IncludeRegistry::new();
    reg.insert("consts", "const float PI = 3.14159;");
    reg.insert("math", "#include \"consts\"\nfloat twice(float x) { return 2. * x; }");

    let out = reg
      .expand("#version 330\n  #include \"math\"\nvoid main() {}")
      .unwrap();

    assert_eq!(
      out,
      "#version 330\nconst float PI = 3.14159;\nfloat twice(float x) { return 2. * x; }\nvoid main() {}\n"
    );
  }

  #[test]
  fn leaves_other_directives_alone() {
    let reg = IncludeRegistry::new();
    let src = "#version 430\n#define includes 1\n#include_guard\n";

    assert_eq!(reg.expand(src).unwrap(), src);
  }

  #[test]
  fn unresolved_include() {
    let reg = IncludeRegistry::new();

    assert_eq!(
      reg.expand("void f();\n#include \"missing\"\n"),
      Err(IncludeError::Unresolved {
        name: "missing".to_owned(),
        line: 2
      })
    );
  }

  #[test]
  fn malformed_include() {
    let reg = IncludeRegistry::new();

    assert!(matches!(
      reg.expand("#include <stdio>"),
      Err(IncludeError::Malformed { line: 1, .. })
    ));
    assert!(matches!(
      reg.expand("#include \"\""),
      Err(IncludeError::Malformed { .. })
    ));
  }

  #[test]
  fn rejects_cycles() {
    let mut reg = IncludeRegistry::new();
    reg.insert("a", "#include \"b\"");
    reg.insert("b", "#include \"a\"");

    let err = reg.expand("#include \"a\"").unwrap_err();
    assert_eq!(
      err,
      IncludeError::Recursive {
        chain: vec!["a".to_owned(), "b".to_owned(), "a".to_owned()]
      }
    );
    assert_eq!(err.to_string(), "recursive include: a -> b -> a");
  }
}
