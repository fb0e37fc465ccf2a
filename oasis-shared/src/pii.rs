use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wraps guest data (national IDs, emails) so it never shows up in log lines.
///
/// `Debug` and `Display` print a fixed mask. `Serialize` writes the real value,
/// since API responses and store writes need it.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn into_inner(self) -> T {
        self.0
    }

    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T> From<T> for Masked<T> {
    fn from(value: T) -> Self {
        Masked(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_hides_value_in_logs() {
        let id = Masked("AB12345".to_string());
        assert_eq!(format!("{:?}", id), "********");
        assert_eq!(format!("{}", id), "********");
        assert_eq!(id.expose(), "AB12345");
    }

    #[test]
    fn test_masked_serializes_real_value() {
        let id = Masked("AB12345".to_string());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"AB12345\"");

        let back: Masked<String> = serde_json::from_str("\"XY998877\"").unwrap();
        assert_eq!(back.into_inner(), "XY998877");
    }
}
