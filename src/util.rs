pub mod test {
    use pretty_assertions::assert_eq;

    /// compares hex encodings, which gives readable diffs for key material and ciphertexts
    #[allow(clippy::missing_panics_doc)]
    pub fn assert_bytes_eq(l: &[u8], r: &[u8]) {
        assert_eq!(hex::encode(l), hex::encode(r));
    }
}
