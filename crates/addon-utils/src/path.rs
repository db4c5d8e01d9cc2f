use std::{env, path::PathBuf};

use crate::error::{PathError, PathResult};

/// Resolves a path that may contain `$VAR`/`${VAR}` references and a leading `~`.
///
/// Relative results are anchored at the current working directory.
///
/// # Errors
///
/// * [`PathError::Empty`] if the path is empty
/// * [`PathError::CurrentDir`] if the current directory cannot be determined
/// * [`PathError::MissingEnvVar`] if a referenced variable is undefined
/// * [`PathError::UnclosedVariable`] if a `${` is never closed
pub fn resolve_path(path: &str) -> PathResult<PathBuf> {
    let path = path.trim();
    if path.is_empty() {
        return Err(PathError::Empty);
    }

    let expanded = PathBuf::from(expand_variables(path)?);
    if expanded.is_absolute() {
        return Ok(expanded);
    }

    env::current_dir()
        .map(|cwd| cwd.join(expanded))
        .map_err(|err| PathError::CurrentDir { source: err })
}

/// Returns `$HOME`, falling back to `/root` inside the installation system.
pub fn home_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/root"))
}

/// Returns `$XDG_CONFIG_HOME`, or `$HOME/.config` when unset.
pub fn xdg_config_home() -> PathBuf {
    env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns `$XDG_CACHE_HOME`, or `$HOME/.cache` when unset.
pub fn xdg_cache_home() -> PathBuf {
    env::var("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".cache"))
}

fn expand_variables(input: &str) -> PathResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    if let Some(stripped) = rest.strip_prefix('~') {
        out.push_str(&home_dir().to_string_lossy());
        rest = stripped;
    }

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let (name, remaining) = if let Some(braced) = after.strip_prefix('{') {
            let end = braced.find('}').ok_or_else(|| PathError::UnclosedVariable {
                input: format!("${{{braced}"),
            })?;
            (&braced[..end], &braced[end + 1..])
        } else {
            let end = after
                .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], &after[end..])
        };

        if name.is_empty() {
            out.push('$');
        } else {
            let value = env::var(name).map_err(|_| PathError::MissingEnvVar {
                var: name.to_string(),
                input: input.to_string(),
            })?;
            out.push_str(&value);
        }
        rest = remaining;
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_expand_simple_and_braced() {
        env::set_var("ADDON_TEST_ROOT", "/mnt");
        assert_eq!(
            resolve_path("$ADDON_TEST_ROOT/inst-sys").unwrap(),
            PathBuf::from("/mnt/inst-sys")
        );
        assert_eq!(
            resolve_path("${ADDON_TEST_ROOT}/work").unwrap(),
            PathBuf::from("/mnt/work")
        );
        env::remove_var("ADDON_TEST_ROOT");
    }

    #[test]
    #[serial]
    fn test_expand_tilde() {
        env::set_var("HOME", "/home/installer");
        assert_eq!(
            resolve_path("~/addon").unwrap(),
            PathBuf::from("/home/installer/addon")
        );
    }

    #[test]
    #[serial]
    fn test_missing_variable() {
        env::remove_var("ADDON_TEST_MISSING");
        assert!(matches!(
            resolve_path("$ADDON_TEST_MISSING/x"),
            Err(PathError::MissingEnvVar { .. })
        ));
    }

    #[test]
    fn test_unclosed_variable_and_empty() {
        assert!(matches!(
            resolve_path("${UNCLOSED/x"),
            Err(PathError::UnclosedVariable { .. })
        ));
        assert!(matches!(resolve_path("   "), Err(PathError::Empty)));
    }

    #[test]
    fn test_lone_dollar_is_kept() {
        assert_eq!(resolve_path("/tmp/$/x").unwrap(), PathBuf::from("/tmp/$/x"));
    }

    #[test]
    fn test_relative_is_anchored() {
        let resolved = resolve_path("relative/dir").unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("relative/dir"));
    }
}
