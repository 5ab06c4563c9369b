/// `postgresql.conf` parsing.
///
/// Supports the subset of the server's configuration grammar needed to report on
/// a cluster: `name [=] value` lines, `#` comments, single-quoted values with `''`
/// and backslash escapes, and the `include`, `include_if_exists` and `include_dir`
/// directives. Names are case-insensitive and stored lowercase; later assignments
/// override earlier ones.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::cluster::ClusterError;

/// Parsed settings, keyed by lowercase name.
pub type Settings = BTreeMap<String, String>;

/// Maximum nesting of `include` directives.
const MAX_INCLUDE_DEPTH: usize = 10;

static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_.\-]*)\s*=?\s*(.*)$").expect("static regex")
});

/// Read a configuration file, following include directives.
///
/// # Errors
///
/// - `ClusterError::Io` — the file or a mandatory include cannot be read
/// - `ClusterError::Config` — a line is malformed or includes nest too deeply
pub fn read_conf_file(path: &Path) -> Result<Settings, ClusterError> {
    let mut settings = Settings::new();
    read_into(path, &mut settings, 0)?;
    Ok(settings)
}

/// Read `path` and apply its settings on top of `settings`.
///
/// # Errors
///
/// Same as [`read_conf_file`].
pub fn read_into(path: &Path, settings: &mut Settings, depth: usize) -> Result<(), ClusterError> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(ClusterError::Config {
            path: path.to_owned(),
            message: "include files nested too deeply".to_owned(),
        });
    }

    let text = fs::read_to_string(path).map_err(|e| ClusterError::io(path, e))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    for (idx, line) in text.lines().enumerate() {
        let parsed = parse_line(line).map_err(|message| ClusterError::Config {
            path: path.to_owned(),
            message: format!("line {}: {message}", idx + 1),
        })?;
        let Some((name, value)) = parsed else {
            continue;
        };

        match name.as_str() {
            "include" => read_into(&base.join(&value), settings, depth + 1)?,
            "include_if_exists" => {
                let target = base.join(&value);
                if target.exists() {
                    read_into(&target, settings, depth + 1)?;
                } else {
                    tracing::debug!(path = %target.display(), "skipping missing optional include");
                }
            }
            "include_dir" => {
                for file in conf_files_in(&base.join(&value))? {
                    read_into(&file, settings, depth + 1)?;
                }
            }
            _ => {
                settings.insert(name, value);
            }
        }
    }

    Ok(())
}

/// `*.conf` files in `dir`, in name order, skipping hidden files.
fn conf_files_in(dir: &Path) -> Result<Vec<PathBuf>, ClusterError> {
    let entries = fs::read_dir(dir).map_err(|e| ClusterError::io(dir, e))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| {
            let name = p.file_name().and_then(|n| n.to_str()).unwrap_or("");
            !name.starts_with('.') && name.ends_with(".conf") && p.is_file()
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Parse one line into a lowercase name and its value.
///
/// Returns `Ok(None)` for blank and comment lines.
///
/// # Errors
///
/// Returns a description of the problem for malformed lines.
pub fn parse_line(line: &str) -> Result<Option<(String, String)>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let caps = LINE_RE
        .captures(line)
        .ok_or_else(|| "syntax error".to_owned())?;
    let name = caps[1].to_lowercase();
    let rest = caps.get(2).map_or("", |m| m.as_str());

    let (value, tail) = if let Some(quoted) = rest.strip_prefix('\'') {
        parse_quoted(quoted)?
    } else {
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '#')
            .unwrap_or(rest.len());
        if end == 0 {
            return Err(format!("missing value for '{name}'"));
        }
        (rest[..end].to_owned(), &rest[end..])
    };

    let tail = tail.trim_start();
    if !tail.is_empty() && !tail.starts_with('#') {
        return Err(format!("trailing garbage after value of '{name}'"));
    }

    Ok(Some((name, value)))
}

/// Parse the body of a single-quoted value; `s` starts after the opening quote.
///
/// Backslash escapes follow the server: `\b \f \n \r \t`, one to three octal
/// digits for a byte value (truncated to 8 bits, read as Latin-1), and any other
/// character taken literally.
fn parse_quoted(s: &str) -> Result<(String, &str), String> {
    let mut value = String::new();
    let mut chars = s.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '\'' => {
                if let Some(&(_, '\'')) = chars.peek() {
                    chars.next();
                    value.push('\'');
                } else {
                    return Ok((value, &s[i + 1..]));
                }
            }
            '\\' => match chars.next() {
                Some((_, 'b')) => value.push('\u{8}'),
                Some((_, 'f')) => value.push('\u{c}'),
                Some((_, 'n')) => value.push('\n'),
                Some((_, 'r')) => value.push('\r'),
                Some((_, 't')) => value.push('\t'),
                Some((_, first)) if first.is_digit(8) => {
                    let mut byte = first.to_digit(8).unwrap_or(0);
                    for _ in 0..2 {
                        match chars.peek().and_then(|&(_, d)| d.to_digit(8)) {
                            Some(d) => {
                                byte = (byte << 3) + d;
                                chars.next();
                            }
                            None => break,
                        }
                    }
                    value.push(char::from(byte.to_le_bytes()[0]));
                }
                Some((_, other)) => value.push(other),
                None => break,
            },
            other => value.push(other),
        }
    }

    Err("unterminated quoted string".to_owned())
}

/// Interpret a configuration value as a boolean the way the server does.
///
/// Accepts `on`/`off`, `true`/`false`, `yes`/`no`, `1`/`0` and unique
/// prefixes of the words, case-insensitively. Anything else is `false`.
#[must_use]
pub fn config_bool(value: Option<&str>) -> bool {
    let Some(value) = value else {
        return false;
    };
    let v = value.trim().to_lowercase();
    if v.is_empty() {
        return false;
    }
    v == "1" || v == "on" || "true".starts_with(&v) || "yes".starts_with(&v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_simple_lines() {
        assert_eq!(
            parse_line("port = 5433").unwrap(),
            Some(("port".to_owned(), "5433".to_owned()))
        );
        assert_eq!(
            parse_line("Port 5433   # the port").unwrap(),
            Some(("port".to_owned(), "5433".to_owned()))
        );
        assert_eq!(
            parse_line("logging_collector=on").unwrap(),
            Some(("logging_collector".to_owned(), "on".to_owned()))
        );
    }

    #[test]
    fn test_parse_comments_and_blanks() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("#port = 5432").unwrap(), None);
    }

    #[test]
    fn test_parse_quoted_values() {
        assert_eq!(
            parse_line("data_directory = '/var/lib/postgresql/13/main' # comment").unwrap(),
            Some((
                "data_directory".to_owned(),
                "/var/lib/postgresql/13/main".to_owned()
            ))
        );
        assert_eq!(
            parse_line(r"log_line_prefix = 'it''s \'quoted\''").unwrap(),
            Some(("log_line_prefix".to_owned(), "it's 'quoted'".to_owned()))
        );
        assert_eq!(
            parse_line("log_destination = ''").unwrap(),
            Some(("log_destination".to_owned(), String::new()))
        );
    }

    #[test]
    fn test_parse_octal_escapes() {
        assert_eq!(
            parse_line(r"x = '\101\102'").unwrap(),
            Some(("x".to_owned(), "AB".to_owned()))
        );
        // At most three digits, then ordinary text resumes.
        assert_eq!(
            parse_line(r"x = '\1011\7z'").unwrap(),
            Some(("x".to_owned(), "A1\u{7}z".to_owned()))
        );
        // Values past one byte keep the low eight bits.
        assert_eq!(
            parse_line(r"x = '\501'").unwrap(),
            Some(("x".to_owned(), "A".to_owned()))
        );
        assert_eq!(
            parse_line(r"x = '\8'").unwrap(),
            Some(("x".to_owned(), "8".to_owned()))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_line("x = 'open").is_err());
        assert!(parse_line("x =").is_err());
        assert!(parse_line("x = 'a' b").is_err());
        assert!(parse_line("= 3").is_err());
    }

    #[test]
    fn test_config_bool() {
        for yes in ["on", "ON", "true", "t", "yes", "y", "1"] {
            assert!(config_bool(Some(yes)), "{yes}");
        }
        for no in ["off", "false", "no", "0", "", "o", "maybe"] {
            assert!(!config_bool(Some(no)), "{no}");
        }
        assert!(!config_bool(None));
    }

    #[test]
    fn test_read_file_with_includes() {
        let dir = TempDir::new().unwrap();
        let conf_d = dir.path().join("conf.d");
        fs::create_dir(&conf_d).unwrap();
        fs::write(
            dir.path().join("postgresql.conf"),
            "port = 5432\n\
             include 'extra.conf'\n\
             include_if_exists 'missing.conf'\n\
             include_dir 'conf.d'\n",
        )
        .unwrap();
        fs::write(dir.path().join("extra.conf"), "log_directory = 'logs'\n").unwrap();
        fs::write(conf_d.join("10-port.conf"), "port = 5433\n").unwrap();
        fs::write(conf_d.join("20-port.conf"), "port = 5434\n").unwrap();
        fs::write(conf_d.join("ignored.txt"), "port = 1\n").unwrap();

        let settings = read_conf_file(&dir.path().join("postgresql.conf")).unwrap();
        assert_eq!(settings["port"], "5434");
        assert_eq!(settings["log_directory"], "logs");
        assert!(!settings.contains_key("include"));
    }

    #[test]
    fn test_missing_include_fails() {
        let dir = TempDir::new().unwrap();
        let conf = dir.path().join("postgresql.conf");
        fs::write(&conf, "include 'nope.conf'\n").unwrap();
        assert!(matches!(
            read_conf_file(&conf),
            Err(ClusterError::Io { .. })
        ));
    }

    #[test]
    fn test_recursive_include_fails() {
        let dir = TempDir::new().unwrap();
        let conf = dir.path().join("postgresql.conf");
        fs::write(&conf, "include 'postgresql.conf'\n").unwrap();
        assert!(matches!(
            read_conf_file(&conf),
            Err(ClusterError::Config { .. })
        ));
    }

    #[test]
    fn test_malformed_line_reports_position() {
        let dir = TempDir::new().unwrap();
        let conf = dir.path().join("postgresql.conf");
        fs::write(&conf, "port = 5432\nbroken = 'x\n").unwrap();
        let err = read_conf_file(&conf).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }
}
