/// Incremental blake3 fingerprint over a sequence of string fields.
///
/// Every field is length-prefixed before hashing, so `("ab", "c")` and `("a", "bc")`
/// produce different fingerprints.
///
/// # Example
///
/// ```
/// use addon_utils::hash::Fingerprinter;
///
/// let mut fp = Fingerprinter::new();
/// fp.field("0").field("cd:/?devices=/dev/sr0").field("/");
/// assert_eq!(fp.finish().len(), 64);
/// ```
#[derive(Default)]
pub struct Fingerprinter {
    hasher: blake3::Hasher,
    fields: u64,
}

impl Fingerprinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&mut self, value: &str) -> &mut Self {
        self.hasher.update(&(value.len() as u64).to_le_bytes());
        self.hasher.update(value.as_bytes());
        self.fields += 1;
        self
    }

    /// Number of fields fed so far.
    pub fn len(&self) -> u64 {
        self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields == 0
    }

    /// Returns the hex-encoded digest.
    pub fn finish(&self) -> String {
        let mut hasher = self.hasher.clone();
        hasher.update(&self.fields.to_le_bytes());
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint(fields: &[&str]) -> String {
        let mut fp = Fingerprinter::new();
        for field in fields {
            fp.field(field);
        }
        fp.finish()
    }

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(
            fingerprint(&["0", "dvd:///?devices=/dev/sr0", "/p0"]),
            fingerprint(&["0", "dvd:///?devices=/dev/sr0", "/p0"])
        );
    }

    #[test]
    fn test_fingerprint_field_boundaries() {
        assert_ne!(fingerprint(&["ab", "c"]), fingerprint(&["a", "bc"]));
        assert_ne!(fingerprint(&[]), fingerprint(&[""]));
    }

    #[test]
    fn test_fingerprint_order_matters() {
        assert_ne!(fingerprint(&["/p0", "/p1"]), fingerprint(&["/p1", "/p0"]));
    }
}
