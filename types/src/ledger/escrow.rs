use bytes::{Buf, BufMut};
use commonware_codec::{Error, FixedSize, Read, ReadExt, Write};

/// Native value held by the engines on behalf of open games and auctions.
///
/// `held` always equals the sum of every unresolved game pot plus every
/// unsettled auction's highest bid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValueEscrow {
    pub held: u64,
    pub total_deposited: u64,
    pub total_released: u64,
}

impl Write for ValueEscrow {
    fn write(&self, writer: &mut impl BufMut) {
        self.held.write(writer);
        self.total_deposited.write(writer);
        self.total_released.write(writer);
    }
}

impl Read for ValueEscrow {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            held: u64::read(reader)?,
            total_deposited: u64::read(reader)?,
            total_released: u64::read(reader)?,
        })
    }
}

impl FixedSize for ValueEscrow {
    const SIZE: usize = u64::SIZE * 3;
}
