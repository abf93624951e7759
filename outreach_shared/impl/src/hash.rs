use outreach_models::Sha256Hash;
use outreach_shared_contracts::hash::HashService;
use outreach_utils::trace_instrument;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, Default)]
pub struct HashServiceImpl;

impl HashService for HashServiceImpl {
    #[trace_instrument(skip(self))]
    fn sha256(&self, data: &[u8]) -> Sha256Hash {
        Sha256Hash(Sha256::digest(data).into())
    }
}
