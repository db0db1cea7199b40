use std::path::Path;

use openssl::{
    error::ErrorStack,
    ssl::SslFiletype,
    x509::{
        store::{X509Lookup, X509Store, X509StoreBuilder},
        verify::{X509VerifyFlags, X509VerifyParam},
        X509PurposeId, X509,
    },
};

use crate::error::{CryptoError, Result};

fn trust_store_error(err: ErrorStack) -> CryptoError {
    log::debug!("Configuring trust store failed, OpenSSL error stack: {err}");
    CryptoError::TrustStore(err.to_string())
}

/// Collects trusted certificates and verification settings into an [`X509Store`]
///
/// ```no_run
/// # use evp_aead::trust_store::TrustStore;
/// # fn main() -> evp_aead::error::Result<()> {
/// let mut trust_store = TrustStore::new()?;
/// trust_store.load_locations("/etc/ssl/certs")?;
/// trust_store.set_depth(4)?;
/// let store = trust_store.build();
/// # Ok(())
/// # }
/// ```
pub struct TrustStore {
    builder: X509StoreBuilder,
}

impl TrustStore {
    pub fn new() -> Result<Self> {
        let builder = X509StoreBuilder::new().map_err(trust_store_error)?;
        Ok(Self { builder })
    }

    /// Adds a single trusted certificate
    pub fn add_certificate(&mut self, certificate: X509) -> Result<()> {
        self.builder.add_cert(certificate).map_err(trust_store_error)
    }

    /// Registers the file lookup method, used for explicitly loaded PEM files
    pub fn add_file_lookup(&mut self) -> Result<()> {
        self.builder
            .add_lookup(X509Lookup::file())
            .map_err(trust_store_error)?;
        Ok(())
    }

    /// Registers a hashed certificate directory (`c_rehash` layout), certificates are looked up on demand
    pub fn add_hash_dir_lookup(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        let dir_name = dir.to_str().ok_or_else(|| {
            CryptoError::TrustStore(format!("{} is not valid UTF-8", dir.display()))
        })?;

        self.builder
            .add_lookup(X509Lookup::hash_dir())
            .map_err(trust_store_error)?
            .add_dir(dir_name, SslFiletype::PEM)
            .map_err(trust_store_error)
    }

    /// Limits the length of verified certificate chains
    pub fn set_depth(&mut self, depth: u32) -> Result<()> {
        let depth = i32::try_from(depth).map_err(|_| {
            CryptoError::TrustStore(format!("verification depth {depth} is too large"))
        })?;

        let mut param = X509VerifyParam::new().map_err(trust_store_error)?;
        param.set_depth(depth);
        self.builder.set_param(&param).map_err(trust_store_error)
    }

    pub fn set_flags(&mut self, flags: X509VerifyFlags) -> Result<()> {
        self.builder.set_flags(flags).map_err(trust_store_error)
    }

    pub fn set_purpose(&mut self, purpose: X509PurposeId) -> Result<()> {
        self.builder.set_purpose(purpose).map_err(trust_store_error)
    }

    /// Trusts the certificate locations OpenSSL was configured with
    pub fn load_default_paths(&mut self) -> Result<()> {
        self.builder.set_default_paths().map_err(trust_store_error)
    }

    /// Trusts the certificates at `location`.
    /// A file is loaded as PEM bundle, a directory is registered as hashed directory lookup.
    ///
    /// Fails with [`CryptoError::CertificateLocationNotFound`] if `location` does not exist.
    pub fn load_locations(&mut self, location: impl AsRef<Path>) -> Result<()> {
        let location = location.as_ref();
        if !location.exists() {
            return Err(CryptoError::CertificateLocationNotFound(location.to_path_buf()));
        }

        if location.is_dir() {
            log::debug!("Adding certificate directory {}", location.display());
            return self.add_hash_dir_lookup(location);
        }

        log::debug!("Loading certificates from {}", location.display());
        self.builder
            .add_lookup(X509Lookup::file())
            .map_err(trust_store_error)?
            .load_cert_file(location, SslFiletype::PEM)
            .map_err(trust_store_error)
    }

    pub fn build(self) -> X509Store {
        self.builder.build()
    }
}

#[cfg(test)]
mod test {
    use std::{
        fs,
        path::PathBuf,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use openssl::{
        asn1::Asn1Time,
        bn::BigNum,
        ec::{EcGroup, EcKey},
        hash::MessageDigest,
        nid::Nid,
        pkey::PKey,
        stack::Stack,
        x509::{extension::BasicConstraints, X509NameBuilder, X509StoreContext},
    };
    use pretty_assertions::assert_eq;

    fn self_signed_certificate(common_name: &str) -> X509 {
        let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
        let key = PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap();

        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_nid(Nid::COMMONNAME, common_name).unwrap();
        let name = name.build();

        let mut builder = X509::builder().unwrap();
        builder.set_version(2).unwrap();
        let serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();
        builder.set_serial_number(&serial).unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder.set_pubkey(&key).unwrap();
        builder
            .set_not_before(&Asn1Time::days_from_now(0).unwrap())
            .unwrap();
        builder
            .set_not_after(&Asn1Time::days_from_now(1).unwrap())
            .unwrap();
        builder
            .append_extension(BasicConstraints::new().critical().ca().build().unwrap())
            .unwrap();
        builder.sign(&key, MessageDigest::sha256()).unwrap();
        builder.build()
    }

    fn verify(store: &X509Store, certificate: &X509) -> bool {
        let chain = Stack::new().unwrap();
        let mut ctx = X509StoreContext::new().unwrap();
        ctx.init(store, certificate, &chain, |ctx| ctx.verify_cert())
            .unwrap()
    }

    fn scratch_path(name: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let unique = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!("trust-store-{}-{unique}-{name}", std::process::id()))
    }

    #[test]
    fn verifies_added_certificate() {
        let certificate = self_signed_certificate("added");
        let mut trust_store = TrustStore::new().unwrap();
        trust_store.add_certificate(certificate.clone()).unwrap();

        assert!(verify(&trust_store.build(), &certificate));
    }

    #[test]
    fn rejects_unknown_certificate() {
        let trusted = self_signed_certificate("trusted");
        let unknown = self_signed_certificate("unknown");
        let mut trust_store = TrustStore::new().unwrap();
        trust_store.add_certificate(trusted).unwrap();

        assert!(!verify(&trust_store.build(), &unknown));
    }

    #[test]
    fn loads_pem_file() {
        let certificate = self_signed_certificate("from file");
        let path = scratch_path("cert.pem");
        fs::write(&path, certificate.to_pem().unwrap()).unwrap();

        let mut trust_store = TrustStore::new().unwrap();
        trust_store.load_locations(&path).unwrap();
        let store = trust_store.build();
        fs::remove_file(&path).unwrap();

        assert!(verify(&store, &certificate));
    }

    #[test]
    fn loads_every_certificate_of_pem_bundle() {
        let first = self_signed_certificate("bundle first");
        let second = self_signed_certificate("bundle second");
        let path = scratch_path("bundle.pem");
        let mut bundle = first.to_pem().unwrap();
        bundle.extend(second.to_pem().unwrap());
        fs::write(&path, bundle).unwrap();

        let mut trust_store = TrustStore::new().unwrap();
        trust_store.load_locations(&path).unwrap();
        let store = trust_store.build();
        fs::remove_file(&path).unwrap();

        assert!(verify(&store, &first));
        assert!(verify(&store, &second));
    }

    #[test]
    fn looks_up_certificates_in_hashed_dir() {
        let certificate = self_signed_certificate("from dir");
        let dir = scratch_path("certs");
        fs::create_dir_all(&dir).unwrap();
        let file_name = format!("{:08x}.0", certificate.subject_name_hash());
        fs::write(dir.join(file_name), certificate.to_pem().unwrap()).unwrap();

        let mut trust_store = TrustStore::new().unwrap();
        trust_store.load_locations(&dir).unwrap();
        let store = trust_store.build();

        let verified = verify(&store, &certificate);
        fs::remove_dir_all(&dir).unwrap();
        assert!(verified);
    }

    #[test]
    fn rejects_missing_location() {
        let path = scratch_path("does-not-exist.pem");
        let mut trust_store = TrustStore::new().unwrap();

        assert_eq!(
            trust_store.load_locations(&path),
            Err(CryptoError::CertificateLocationNotFound(path))
        );
    }

    #[test]
    fn reports_malformed_pem_file() {
        let path = scratch_path("garbage.pem");
        fs::write(&path, b"-----BEGIN CERTIFICATE-----\nnot base64\n-----END CERTIFICATE-----\n")
            .unwrap();

        let mut trust_store = TrustStore::new().unwrap();
        let result = trust_store.load_locations(&path);
        fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(CryptoError::TrustStore(_))));
    }

    #[test]
    fn applies_verification_settings() {
        let certificate = self_signed_certificate("settings");
        let mut trust_store = TrustStore::new().unwrap();
        trust_store.add_certificate(certificate.clone()).unwrap();
        trust_store.add_file_lookup().unwrap();
        trust_store.set_depth(2).unwrap();
        trust_store.set_flags(X509VerifyFlags::PARTIAL_CHAIN).unwrap();
        trust_store.set_purpose(X509PurposeId::ANY).unwrap();

        assert!(verify(&trust_store.build(), &certificate));
    }

    #[test]
    fn rejects_depth_overflowing_openssl() {
        let mut trust_store = TrustStore::new().unwrap();
        assert!(matches!(
            trust_store.set_depth(u32::MAX),
            Err(CryptoError::TrustStore(_))
        ));
    }
}
