/// Lifecycle position of a game or auction at a given timestamp.
///
/// `Open -> Expired` is never stored: it is derived from the record's end time
/// and the current block timestamp. Only settlement is persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Open,
    Expired,
    Settled,
}

impl Phase {
    pub fn at(now: u64, end_time: u64, settled: bool) -> Self {
        if settled {
            Self::Settled
        } else if now < end_time {
            Self::Open
        } else {
            Self::Expired
        }
    }
}
