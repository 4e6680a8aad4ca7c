//! Ledger monetary constants
//!
//! Values are plain integer units. The ledger has no notion of fees or reward
//! schedules: a block's coinbase is just a list of outputs.

/// Default coinbase payout for blocks built with `Block::new`
pub const COINBASE_REWARD: i64 = 25;

/// Sum a set of values without wrapping, `None` on overflow
pub fn checked_sum<I>(values: I) -> Option<i64>
where
    I: IntoIterator<Item = i64>,
{
    values
        .into_iter()
        .try_fold(0i64, |total, value| total.checked_add(value))
}
