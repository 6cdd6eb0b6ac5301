#![allow(dead_code)]

use std::io::{Cursor, Read};
use std::net::TcpListener;

use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use sequoia_openpgp as openpgp;

use openpgp::cert::{Cert, CertBuilder};
use openpgp::crypto::SessionKey;
use openpgp::Packet;
use openpgp::packet::{Literal, PKESK, SKESK};
use openpgp::parse::{PacketParser, PacketParserResult, Parse};
use openpgp::parse::stream::{
    DecryptionHelper, DecryptorBuilder, MessageStructure, VerificationHelper,
};
use openpgp::policy::{Policy, StandardPolicy};
use openpgp::serialize::SerializeInto;
use openpgp::types::SymmetricAlgorithm;
use openpgp::{Fingerprint, KeyHandle};

// ─── Keys ────────────────────────────────────────────────────────

/// Generate a fresh encrypt-capable key pair for `uid`.
pub fn generate_cert(uid: &str) -> Cert {
    CertBuilder::general_purpose(None, Some(uid))
        .generate()
        .unwrap()
        .0
}

/// ASCII-armored public half of `cert`.
pub fn armored_public(cert: &Cert) -> Vec<u8> {
    cert.armored().to_vec().unwrap()
}

/// ASCII-armored private key block for `cert`.
pub fn armored_secret(cert: &Cert) -> Vec<u8> {
    cert.as_tsk().armored().to_vec().unwrap()
}

// ─── Decrypt + unzip (the inverse of the writer chain) ───────────

struct Helper<'a> {
    policy: &'a dyn Policy,
    secret: &'a Cert,
}

impl VerificationHelper for Helper<'_> {
    fn get_certs(&mut self, _ids: &[KeyHandle]) -> openpgp::Result<Vec<Cert>> {
        Ok(Vec::new())
    }

    fn check(&mut self, _structure: MessageStructure) -> openpgp::Result<()> {
        Ok(())
    }
}

impl DecryptionHelper for Helper<'_> {
    fn decrypt<D>(
        &mut self,
        pkesks: &[PKESK],
        _skesks: &[SKESK],
        sym_algo: Option<SymmetricAlgorithm>,
        mut decrypt: D,
    ) -> openpgp::Result<Option<Fingerprint>>
    where
        D: FnMut(SymmetricAlgorithm, &SessionKey) -> bool,
    {
        for ka in self
            .secret
            .keys()
            .unencrypted_secret()
            .with_policy(self.policy, None)
            .for_transport_encryption()
        {
            let mut pair = ka.key().clone().into_keypair()?;
            for pkesk in pkesks {
                if pkesk
                    .decrypt(&mut pair, sym_algo)
                    .map(|(algo, session_key)| decrypt(algo, &session_key))
                    .unwrap_or(false)
                {
                    return Ok(Some(ka.fingerprint()));
                }
            }
        }
        Err(openpgp::Error::InvalidOperation("no matching secret key".into()).into())
    }
}

/// Decrypt an OpenPGP message with `secret`.
pub fn pgp_decrypt(secret: &Cert, ciphertext: &[u8]) -> openpgp::Result<Vec<u8>> {
    let policy = StandardPolicy::new();
    let helper = Helper {
        policy: &policy,
        secret,
    };
    let mut decryptor =
        DecryptorBuilder::from_bytes(ciphertext)?.with_policy(&policy, None, helper)?;
    let mut plaintext = Vec::new();
    decryptor.read_to_end(&mut plaintext)?;
    Ok(plaintext)
}

/// Decrypt an OpenPGP message with `secret` and return its literal data
/// packet header: format, file name and date.
pub fn pgp_literal(secret: &Cert, ciphertext: &[u8]) -> openpgp::Result<Literal> {
    let policy = StandardPolicy::new();
    let mut pkesks: Vec<PKESK> = Vec::new();

    let mut ppr = PacketParser::from_bytes(ciphertext)?;
    while let PacketParserResult::Some(mut pp) = ppr {
        match pp.packet {
            Packet::PKESK(ref pkesk) => pkesks.push(pkesk.clone()),
            Packet::SEIP(_) => {
                let (algo, session_key) = session_key(secret, &policy, &pkesks)?;
                pp.decrypt(algo, &session_key)?;
            }
            Packet::Literal(ref literal) => return Ok(literal.clone()),
            _ => {}
        }
        ppr = pp.recurse()?.1;
    }
    Err(openpgp::Error::InvalidOperation("no literal data packet".into()).into())
}

fn session_key(
    secret: &Cert,
    policy: &dyn Policy,
    pkesks: &[PKESK],
) -> openpgp::Result<(SymmetricAlgorithm, SessionKey)> {
    for ka in secret
        .keys()
        .unencrypted_secret()
        .with_policy(policy, None)
        .for_transport_encryption()
    {
        let mut pair = ka.key().clone().into_keypair()?;
        for pkesk in pkesks {
            if let Some(found) = pkesk.decrypt(&mut pair, None) {
                return Ok(found);
            }
        }
    }
    Err(openpgp::Error::InvalidOperation("no matching secret key".into()).into())
}

/// Decrypt an age file with `identity`.
pub fn age_decrypt(identity: &age::x25519::Identity, ciphertext: &[u8]) -> Vec<u8> {
    let decryptor = age::Decryptor::new(ciphertext).unwrap();
    let mut reader = decryptor
        .decrypt(std::iter::once(identity as &dyn age::Identity))
        .unwrap();
    let mut plaintext = Vec::new();
    reader.read_to_end(&mut plaintext).unwrap();
    plaintext
}

/// A zip entry read back from an archive.
#[derive(Debug)]
pub struct Entry {
    pub name: String,
    pub data: Vec<u8>,
    /// General purpose flags from the entry's local file header.
    pub flags: u16,
}

/// Read every entry of a zip archive held in memory.
pub fn unzip(bytes: &[u8]) -> zip::result::ZipResult<Vec<Entry>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let start = file.header_start() as usize;
        let flags = u16::from_le_bytes([bytes[start + 6], bytes[start + 7]]);
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        entries.push(Entry {
            name: file.name().to_string(),
            data,
            flags,
        });
    }
    Ok(entries)
}

// ─── Mock HTTP endpoints ─────────────────────────────────────────

/// A wiremock server driven from synchronous tests.
///
/// The server answers on its own thread; the runtime here only mounts
/// mocks and reads back what was received.
pub struct MockHttp {
    server: MockServer,
    rt: Runtime,
}

impl MockHttp {
    pub fn start() -> Self {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let server = rt.block_on(MockServer::start());
        Self { server, rt }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<Request> {
        self.rt
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }

    /// Panic unless every mounted `expect(..)` count was met.
    pub fn verify(&self) {
        self.rt.block_on(self.server.verify());
    }
}

/// `GET <route>` answering `status` with `body`, expected exactly `times`.
pub fn get(route: &str, status: u16, body: Vec<u8>, times: u64) -> Mock {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_bytes(body))
        .expect(times)
}

/// `POST <route>` answering `status`, expected exactly `times`.
pub fn post(route: &str, status: u16, times: u64) -> Mock {
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .expect(times)
}

/// An address nothing listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// True if `needle` occurs in `haystack`.
pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    find(haystack, needle).is_some()
}
