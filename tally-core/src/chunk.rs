use crate::error::{Result, TallyError};
use serde::{Deserialize, Serialize};

pub const MAGIC: &[u8; 6] = b"TLYCHK";
pub const VERSION: u16 = 1;
/// magic + version + seq + blake3 + payload_len
pub const HEADER_LEN: usize = 6 + 2 + 8 + 32 + 8;

/// One size-bounded, ordered fragment of a serialized snapshot.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub seq: u64,
    pub payload: Vec<u8>,
}

/// Greedy fixed-size slicing from byte 0; the last chunk may be shorter
/// than `max_size`. Empty input yields zero chunks.
pub fn split(data: &[u8], max_size: usize) -> Result<Vec<Chunk>> {
    if max_size == 0 {
        return Err(TallyError::Encoding("chunk size must be non-zero".into()));
    }
    let mut chunks = Vec::with_capacity(data.len().div_ceil(max_size));
    for (seq, part) in data.chunks(max_size).enumerate() {
        chunks.push(Chunk {
            seq: seq as u64,
            payload: part.to_vec(),
        });
    }
    Ok(chunks)
}

/// Sort by ascending sequence index, require the indices to be exactly
/// `0..n`, and concatenate payloads.
pub fn reassemble(mut chunks: Vec<Chunk>) -> Result<Vec<u8>> {
    chunks.sort_by_key(|c| c.seq);
    let total = chunks.iter().map(|c| c.payload.len()).sum();
    let mut out = Vec::with_capacity(total);
    for (i, c) in chunks.iter().enumerate() {
        let expected = i as u64;
        if c.seq > expected {
            return Err(TallyError::MissingChunk {
                expected,
                found: c.seq,
            });
        }
        if c.seq < expected {
            return Err(TallyError::AmbiguousOrder(c.seq));
        }
        out.extend_from_slice(&c.payload);
    }
    Ok(out)
}

impl Chunk {
    /// Binary document envelope:
    /// `magic | version | seq | blake3(payload) | payload_len | payload`.
    pub fn encode(&self) -> Vec<u8> {
        let hash = blake3::hash(&self.payload);
        let mut out = Vec::with_capacity(HEADER_LEN + self.payload.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.extend_from_slice(&self.seq.to_le_bytes());
        out.extend_from_slice(hash.as_bytes());
        out.extend_from_slice(&(self.payload.len() as u64).to_le_bytes());
        out.extend_from_slice(&self.payload);
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(TallyError::Format(format!(
                "chunk document truncated: {} bytes",
                bytes.len()
            )));
        }
        if &bytes[..6] != MAGIC {
            return Err(TallyError::Format("bad chunk magic".into()));
        }
        let version = u16::from_le_bytes(le_array(&bytes[6..8]));
        if version != VERSION {
            return Err(TallyError::Format(format!(
                "unsupported chunk version {version}"
            )));
        }
        let seq = u64::from_le_bytes(le_array(&bytes[8..16]));
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes[16..48]);
        let payload_len = u64::from_le_bytes(le_array(&bytes[48..56])) as usize;
        let payload = &bytes[HEADER_LEN..];
        if payload.len() != payload_len {
            return Err(TallyError::Format(format!(
                "chunk payload length mismatch: header says {payload_len}, got {}",
                payload.len()
            )));
        }
        if blake3::hash(payload).as_bytes() != &hash {
            return Err(TallyError::Format(format!("chunk {seq} checksum mismatch")));
        }
        Ok(Self {
            seq,
            payload: payload.to_vec(),
        })
    }
}

fn le_array<const N: usize>(slice: &[u8]) -> [u8; N] {
    let mut buf = [0u8; N];
    buf.copy_from_slice(slice);
    buf
}
