use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};
use commonware_cryptography::ed25519::PublicKey;
use std::fmt;

use super::{read_string, string_encode_size, write_string, MAX_COLLECTION_LENGTH};

/// A single non-fungible asset: a collection and a token within it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetRef {
    pub collection: String,
    pub token_id: u64,
}

impl AssetRef {
    pub fn new(collection: impl Into<String>, token_id: u64) -> Self {
        Self {
            collection: collection.into(),
            token_id,
        }
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.collection, self.token_id)
    }
}

impl Write for AssetRef {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.collection, writer);
        self.token_id.write(writer);
    }
}

impl Read for AssetRef {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            collection: read_string(reader, MAX_COLLECTION_LENGTH)?,
            token_id: u64::read(reader)?,
        })
    }
}

impl EncodeSize for AssetRef {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.collection) + self.token_id.encode_size()
    }
}

/// Who currently holds an asset in the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Custodian {
    /// Held by an account.
    Account(PublicKey),
    /// Escrowed by the auction with this id.
    Auction(u64),
}

impl Write for Custodian {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Account(public) => {
                0u8.write(writer);
                public.write(writer);
            }
            Self::Auction(id) => {
                1u8.write(writer);
                id.write(writer);
            }
        }
    }
}

impl Read for Custodian {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        match kind {
            0 => Ok(Self::Account(PublicKey::read(reader)?)),
            1 => Ok(Self::Auction(u64::read(reader)?)),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl EncodeSize for Custodian {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::Account(public) => public.encode_size(),
            Self::Auction(id) => id.encode_size(),
        }
    }
}
