//! Secret reference resolver.
//!
//! The Home Assistant token in `config.toml` can reference a secret stored
//! outside the file:
//!
//! - `env::VAR_NAME` reads `$VAR_NAME` from the environment
//! - `pass::path/in/store` runs `pass show path/in/store` and takes the first line
//! - anything else is used as-is

/// Resolves a value that may carry a secret reference prefix.
pub fn resolve(value: &str) -> Result<String, String> {
    if let Some(var) = value.strip_prefix("env::") {
        resolve_env(var)
    } else if let Some(path) = value.strip_prefix("pass::") {
        resolve_pass(path)
    } else {
        Ok(value.to_string())
    }
}

fn resolve_env(var: &str) -> Result<String, String> {
    std::env::var(var).map_err(|_| format!("environment variable `{}` is not set", var))
}

fn resolve_pass(path: &str) -> Result<String, String> {
    let output = std::process::Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|e| format!("failed to run `pass show {}`: {}", path, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "`pass show {}` failed ({}): {}",
            path,
            output.status,
            stderr.trim()
        ));
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| format!("`pass show {}` produced no output", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_value_passes_through() {
        assert_eq!(resolve("eyJhbGciOi.abc").unwrap(), "eyJhbGciOi.abc");
        assert_eq!(resolve("").unwrap(), "");
    }

    #[test]
    fn env_reference() {
        unsafe {
            std::env::set_var("_CALCARD_TEST_TOKEN", "from-env");
        }
        assert_eq!(resolve("env::_CALCARD_TEST_TOKEN").unwrap(), "from-env");
        unsafe {
            std::env::remove_var("_CALCARD_TEST_TOKEN");
        }
    }

    #[test]
    fn missing_env_var() {
        let err = resolve("env::_CALCARD_UNSET_VARIABLE_4821").unwrap_err();
        assert!(err.contains("not set"));
    }

    #[test]
    fn failing_pass_entry() {
        assert!(resolve("pass::calcard/no/such/entry/4821").is_err());
    }
}
