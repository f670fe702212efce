/// Anything bound to a single store key.
///
/// Transfers only need the destination's key, so they accept any `Keyed`
/// rather than a concrete list type.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for &str {
    fn key(&self) -> &str {
        self
    }
}

impl Keyed for String {
    fn key(&self) -> &str {
        self
    }
}
