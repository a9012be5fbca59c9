// wfrun — Variable environment and `${NAME}` resolution

use super::secret::{self, SecretError, SECRET_BYTES};
use std::collections::HashMap;

/// Placeholder name expanded to a fresh random token at every occurrence.
pub const GENERATE_SECRET: &str = "GENERATE_SECRET";

pub const IP_LOCAL: &str = "IP_LOCAL";
pub const CURRENT_PATH: &str = "CURRENT_PATH";

/// String variables shared by every workflow of one invocation.
///
/// Keys are case-sensitive; the last `set` wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment seeded with `IP_LOCAL` and `CURRENT_PATH`.
    pub fn with_defaults() -> Self {
        let mut env = Self::new();
        env.set(IP_LOCAL, crate::net::local_ipv4().unwrap_or_default());
        let cwd = std::env::current_dir()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();
        env.set(CURRENT_PATH, cwd);
        env
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Expand `${NAME}` placeholders in one left-to-right pass.
    ///
    /// A stored key wins over `${GENERATE_SECRET}`, which becomes a fresh
    /// token per occurrence. Inserted values are never scanned again, and
    /// unknown placeholders are left untouched.
    pub fn resolve(&self, line: &str) -> Result<String, SecretError> {
        let mut out = String::with_capacity(line.len());
        let mut rest = line;

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            if let Some(end) = after.find('}') {
                let name = &after[..end];
                if let Some(value) = self.vars.get(name) {
                    out.push_str(value);
                    rest = &after[end + 1..];
                    continue;
                }
                if name == GENERATE_SECRET {
                    out.push_str(&secret::generate(SECRET_BYTES)?);
                    rest = &after[end + 1..];
                    continue;
                }
            }

            // Not a known placeholder: keep `${` and scan on from just after it.
            out.push_str("${");
            rest = after;
        }

        out.push_str(rest);
        Ok(out)
    }
}

impl<K, V> FromIterator<(K, V)> for Environment
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut env = Self::new();
        for (k, v) in iter {
            env.set(k, v);
        }
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_token(s: &str) -> bool {
        s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
    }

    #[test]
    fn test_resolve_known_variable() {
        let env: Environment = [("K", "value")].into_iter().collect();
        assert_eq!(env.resolve("${K}").unwrap(), "value");
        assert_eq!(env.resolve("a ${K} b ${K}").unwrap(), "a value b value");
    }

    #[test]
    fn test_resolve_unknown_left_verbatim() {
        let env: Environment = [("K", "value")].into_iter().collect();
        assert_eq!(env.resolve("${MISSING} $K {K}").unwrap(), "${MISSING} $K {K}");
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let env: Environment = [("name", "lower")].into_iter().collect();
        assert_eq!(env.resolve("${NAME} ${name}").unwrap(), "${NAME} lower");
    }

    #[test]
    fn test_resolve_prefix_keys() {
        let env: Environment = [("A", "short"), ("AB", "long")].into_iter().collect();
        assert_eq!(env.resolve("${A}-${AB}").unwrap(), "short-long");
    }

    #[test]
    fn test_inserted_values_are_not_rescanned() {
        let env: Environment = [("A", "${B}"), ("B", "x")].into_iter().collect();
        assert_eq!(env.resolve("${A}").unwrap(), "${B}");
        assert_eq!(env.resolve("${A}-${B}").unwrap(), "${B}-x");
    }

    #[test]
    fn test_stored_secret_placeholder_stays_literal() {
        let env: Environment = [("TPL", "${GENERATE_SECRET}")].into_iter().collect();
        assert_eq!(env.resolve("key=${TPL}").unwrap(), "key=${GENERATE_SECRET}");
    }

    #[test]
    fn test_stored_key_shadows_secret() {
        let env: Environment = [("GENERATE_SECRET", "fixed")].into_iter().collect();
        assert_eq!(env.resolve("${GENERATE_SECRET}").unwrap(), "fixed");
    }

    #[test]
    fn test_unknown_outer_placeholder_keeps_scanning() {
        let env: Environment = [("A", "1")].into_iter().collect();
        assert_eq!(env.resolve("${X${A}} ${").unwrap(), "${X1} ${");
    }

    #[test]
    fn test_secret_expands_to_token() {
        let env = Environment::new();
        let out = env.resolve("${GENERATE_SECRET}").unwrap();
        assert!(is_token(&out), "unexpected token: {out}");
    }

    #[test]
    fn test_each_secret_occurrence_is_fresh() {
        let env = Environment::new();
        let out = env.resolve("${GENERATE_SECRET} ${GENERATE_SECRET}").unwrap();
        let parts: Vec<&str> = out.split(' ').collect();
        assert_eq!(parts.len(), 2);
        assert!(is_token(parts[0]) && is_token(parts[1]));
        assert_ne!(parts[0], parts[1]);
    }

    #[test]
    fn test_independent_secret_calls_differ() {
        let env = Environment::new();
        assert_ne!(
            env.resolve("${GENERATE_SECRET}").unwrap(),
            env.resolve("${GENERATE_SECRET}").unwrap()
        );
    }

    #[test]
    fn test_set_overwrites() {
        let mut env = Environment::new();
        env.set("A", "1");
        env.set("A", "2");
        assert_eq!(env.get("A"), Some("2"));
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn test_with_defaults_seeds_path_and_ip() {
        let env = Environment::with_defaults();
        assert!(env.get(IP_LOCAL).is_some());
        let cwd = std::env::current_dir()
            .unwrap()
            .to_string_lossy()
            .to_string();
        assert_eq!(env.get(CURRENT_PATH), Some(cwd.as_str()));
    }
}
