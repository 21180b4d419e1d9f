//! Signed-in user's panel: balance, own sessions and transaction history

pub mod data;

pub use data::{
    own_sessions, past_sessions, transaction_rows, OwnSession, PastSession, TransactionRow,
};
