use std::{collections::BTreeMap, fmt};

use crate::header::reader::is_token;

/// Media type parameters.
///
/// Parameter names are case-insensitive and are stored lowercased; values are stored verbatim.
/// Equality and hashing do not depend on insertion order.
///
/// # Examples
/// ```
/// use quality_source::header::Parameters;
///
/// let params: Parameters = [("Charset", "utf-8"), ("qs", "0.5")].into_iter().collect();
/// assert_eq!(params.get("charset"), Some("utf-8"));
/// assert_eq!(params.get("QS"), Some("0.5"));
/// assert_eq!(params.to_string(), ";charset=utf-8;qs=0.5");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Parameters(BTreeMap<String, String>);

impl Parameters {
    /// Constructs an empty parameter map.
    pub fn new() -> Self {
        Parameters(BTreeMap::new())
    }

    /// Inserts a parameter, returning the previous value under the same name.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.as_ref().to_ascii_lowercase(), value.into())
    }

    /// Looks up a parameter value by case-insensitive name.
    pub fn get(&self, name: &str) -> Option<&str> {
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
        } else {
            self.0.get(name).map(String::as_str)
        }
    }

    /// Returns `true` if a parameter with the given name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// Writes each parameter as `;name=value`, quoting values that are not tokens.
impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            write!(f, ";{}=", name)?;

            if is_token(value) {
                f.write_str(value)?;
            } else {
                f.write_str("\"")?;
                for ch in value.chars() {
                    if ch == '"' || ch == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{}", ch)?;
                }
                f.write_str("\"")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    use super::*;

    fn hash_of<T: Hash>(val: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        val.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn names_are_case_insensitive() {
        let mut params = Parameters::new();
        assert_eq!(params.insert("QS", "0.5"), None);
        assert_eq!(params.insert("qs", "0.7"), Some("0.5".to_owned()));
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("Qs"), Some("0.7"));
        assert!(params.contains("qs"));
        assert!(!params.contains("q"));
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let a: Parameters = [("a", "1"), ("b", "2")].into_iter().collect();
        let b: Parameters = [("b", "2"), ("a", "1")].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let c: Parameters = [("a", "1"), ("b", "3")].into_iter().collect();
        assert_ne!(a, c);
    }

    #[test]
    fn values_are_verbatim() {
        let a: Parameters = [("charset", "UTF-8")].into_iter().collect();
        let b: Parameters = [("charset", "utf-8")].into_iter().collect();
        assert_ne!(a, b);
    }

    #[test]
    fn display_quotes_non_tokens() {
        assert_eq!(Parameters::new().to_string(), "");

        let params: Parameters = [("title", "a \"b\""), ("x", "")].into_iter().collect();
        assert_eq!(params.to_string(), r#";title="a \"b\"";x="""#);
    }
}
