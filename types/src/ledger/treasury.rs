use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};
use commonware_cryptography::ed25519::PublicKey;

use super::BPS_DENOMINATOR;

/// Operator cut of `amount`, rounded down. Saturates at `u64::MAX` for rates
/// above [BPS_DENOMINATOR].
pub fn house_fee(amount: u64, fee_bps: u16) -> u64 {
    let fee = (amount as u128 * fee_bps as u128) / BPS_DENOMINATOR as u128;
    u64::try_from(fee).unwrap_or(u64::MAX)
}

/// Fees collected from every settlement, withdrawable by the owner only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Treasury {
    pub owner: PublicKey,
    pub accrued: u64,
    pub total_collected: u64,
    pub total_withdrawn: u64,
}

impl Treasury {
    pub fn new(owner: PublicKey) -> Self {
        Self {
            owner,
            accrued: 0,
            total_collected: 0,
            total_withdrawn: 0,
        }
    }
}

impl Write for Treasury {
    fn write(&self, writer: &mut impl BufMut) {
        self.owner.write(writer);
        self.accrued.write(writer);
        self.total_collected.write(writer);
        self.total_withdrawn.write(writer);
    }
}

impl Read for Treasury {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            owner: PublicKey::read(reader)?,
            accrued: u64::read(reader)?,
            total_collected: u64::read(reader)?,
            total_withdrawn: u64::read(reader)?,
        })
    }
}

impl EncodeSize for Treasury {
    fn encode_size(&self) -> usize {
        self.owner.encode_size()
            + self.accrued.encode_size()
            + self.total_collected.encode_size()
            + self.total_withdrawn.encode_size()
    }
}
