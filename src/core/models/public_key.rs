use sequoia_openpgp::Cert;

/// Key material a seal backend can encrypt to.
#[derive(Debug, Clone)]
pub enum KeyMaterial {
    /// An OpenPGP certificate (public parts only).
    OpenPgp(Box<Cert>),
    /// An age X25519 recipient.
    Age(age::x25519::Recipient),
}

impl KeyMaterial {
    /// Short name of the key format, used in messages.
    pub fn kind(&self) -> &'static str {
        match self {
            KeyMaterial::OpenPgp(_) => "openpgp",
            KeyMaterial::Age(_) => "age",
        }
    }
}

/// A parsed recipient public key.
///
/// Created by parsing armored key bytes and never written back to disk in
/// this form; only the raw armored bytes live in the key cache.
#[derive(Debug, Clone)]
pub struct PublicKeyRecord {
    fingerprint: Vec<u8>,
    user_ids: Vec<String>,
    material: KeyMaterial,
}

impl PublicKeyRecord {
    pub fn new(fingerprint: Vec<u8>, user_ids: Vec<String>, material: KeyMaterial) -> Self {
        Self {
            fingerprint,
            user_ids,
            material,
        }
    }

    /// Raw fingerprint bytes.
    pub fn fingerprint(&self) -> &[u8] {
        &self.fingerprint
    }

    /// Fingerprint as uppercase hex, the form printed to users.
    pub fn fingerprint_hex(&self) -> String {
        self.fingerprint.iter().map(|b| format!("{b:02X}")).collect()
    }

    pub fn user_ids(&self) -> &[String] {
        &self.user_ids
    }

    pub fn material(&self) -> &KeyMaterial {
        &self.material
    }
}

impl std::fmt::Display for PublicKeyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.user_ids.first() {
            Some(uid) => write!(f, "{} ({})", self.fingerprint_hex(), uid),
            None => write!(f, "{}", self.fingerprint_hex()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn age_record(user_ids: Vec<String>) -> PublicKeyRecord {
        let recipient = age::x25519::Identity::generate().to_public();
        PublicKeyRecord::new(vec![0x0a, 0xff, 0x01], user_ids, KeyMaterial::Age(recipient))
    }

    #[test]
    fn fingerprint_hex_is_uppercase_and_padded() {
        assert_eq!(age_record(Vec::new()).fingerprint_hex(), "0AFF01");
    }

    #[test]
    fn display_includes_first_user_id() {
        let record = age_record(vec!["alice".into(), "alice2".into()]);
        assert_eq!(record.to_string(), "0AFF01 (alice)");
        assert_eq!(age_record(Vec::new()).to_string(), "0AFF01");
    }

    #[test]
    fn material_kind_names() {
        assert_eq!(age_record(Vec::new()).material().kind(), "age");
    }
}
