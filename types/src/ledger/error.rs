use bytes::{Buf, BufMut};
use commonware_codec::{Error, FixedSize, Read, ReadExt, Write};
use thiserror::Error as ThisError;

/// Reason a transaction was rejected.
///
/// A rejected transaction leaves the ledger untouched (apart from the
/// sender's nonce) and is reported on the event stream with one of these
/// codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ThisError)]
#[repr(u8)]
pub enum LedgerError {
    #[error("invalid parameter")]
    InvalidParameter = 1,
    #[error("record not found")]
    NotFound = 2,
    #[error("window closed")]
    WindowClosed = 3,
    #[error("window still open")]
    WindowOpen = 4,
    #[error("value must be non-zero")]
    ZeroValue = 5,
    #[error("pool cap exceeded")]
    CapExceeded = 6,
    #[error("bid too low")]
    BidTooLow = 7,
    #[error("already settled")]
    AlreadySettled = 8,
    #[error("unauthorized")]
    Unauthorized = 9,
    #[error("insufficient funds")]
    InsufficientFunds = 10,
    #[error("arithmetic overflow")]
    Overflow = 11,
}

impl LedgerError {
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl Write for LedgerError {
    fn write(&self, writer: &mut impl BufMut) {
        self.code().write(writer);
    }
}

impl Read for LedgerError {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        match value {
            1 => Ok(Self::InvalidParameter),
            2 => Ok(Self::NotFound),
            3 => Ok(Self::WindowClosed),
            4 => Ok(Self::WindowOpen),
            5 => Ok(Self::ZeroValue),
            6 => Ok(Self::CapExceeded),
            7 => Ok(Self::BidTooLow),
            8 => Ok(Self::AlreadySettled),
            9 => Ok(Self::Unauthorized),
            10 => Ok(Self::InsufficientFunds),
            11 => Ok(Self::Overflow),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for LedgerError {
    const SIZE: usize = 1;
}
