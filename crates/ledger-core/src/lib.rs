//! Core of a minimal proof-of-work ledger: blocks and transactions, block
//! hashing, the mining puzzle, whole-chain validation and longest-valid-chain
//! consensus. Everything here is synchronous and transport agnostic.

pub mod consensus;
pub mod constants;
pub mod error;
pub mod hash;
pub mod ledger;
pub mod peers;
pub mod pow;
pub mod validate;

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::time::{SystemTime, UNIX_EPOCH};

pub use consensus::{resolve, ChainFetcher, PeerChain, Resolution};
pub use error::{LedgerError, PeerError, ReplaceError, ValidationError};
pub use hash::hash_block;
pub use ledger::Ledger;
pub use peers::PeerSet;

pub type Hash = [u8; 32];

/// A transfer between two opaque parties. `amount` is any JSON number and is
/// carried as received; there are no balances to check it against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub receiver: String,
    pub amount: Number,
}

impl Transaction {
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: impl Into<Number>,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            amount: amount.into(),
        }
    }
}

/// A transaction as submitted by a client, before required fields are checked.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewTransaction {
    pub sender: Option<String>,
    pub receiver: Option<String>,
    pub amount: Option<Number>,
}

impl TryFrom<NewTransaction> for Transaction {
    type Error = LedgerError;

    fn try_from(tx: NewTransaction) -> Result<Self, Self::Error> {
        Ok(Transaction {
            sender: tx.sender.ok_or(LedgerError::MalformedTransaction("sender"))?,
            receiver: tx
                .receiver
                .ok_or(LedgerError::MalformedTransaction("receiver"))?,
            amount: tx.amount.ok_or(LedgerError::MalformedTransaction("amount"))?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: u64,
    pub proof: u64,
    pub previous_hash: String,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(
        index: u64,
        proof: u64,
        previous_hash: String,
        transactions: Vec<Transaction>,
    ) -> Self {
        Self {
            index,
            timestamp: unix_now(),
            proof,
            previous_hash,
            transactions,
        }
    }

    pub fn genesis() -> Self {
        Self::new(
            1,
            constants::GENESIS_PROOF,
            constants::GENESIS_PREVIOUS_HASH.to_string(),
            Vec::new(),
        )
    }

    /// Shape check only; the timestamp is never compared.
    pub fn is_genesis(&self) -> bool {
        self.index == 1
            && self.proof == constants::GENESIS_PROOF
            && self.previous_hash == constants::GENESIS_PREVIOUS_HASH
            && self.transactions.is_empty()
    }

    pub fn hash(&self) -> String {
        hash::hash_block(self)
    }
}

/// Seconds since the Unix epoch; 0 if the clock is before it.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_block_example() {
        let genesis = Block::genesis();
        assert_eq!(genesis.index, 1);
        assert_eq!(genesis.proof, 1);
        assert_eq!(genesis.previous_hash, "0");
        assert!(genesis.transactions.is_empty());
        assert!(genesis.timestamp > 0);
        assert!(genesis.is_genesis());
    }

    #[test]
    fn transaction_serialization_example() {
        let tx = Transaction::new("Alice", "Bob", 10);
        let json = serde_json::to_string(&tx).unwrap();
        assert_eq!(json, r#"{"sender":"Alice","receiver":"Bob","amount":10}"#);
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(tx, back);
    }

    #[test]
    fn block_wire_keys_are_stable() {
        let block = Block {
            index: 2,
            timestamp: 1_600_000_000,
            proof: 533,
            previous_hash: "abc".into(),
            transactions: vec![Transaction::new("a", "b", 1)],
        };
        let value = serde_json::to_value(&block).unwrap();
        let obj = value.as_object().unwrap();
        let mut keys: Vec<_> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["index", "previous_hash", "proof", "timestamp", "transactions"]
        );
    }

    #[test]
    fn new_transaction_requires_every_field() {
        let full = NewTransaction {
            sender: Some("a".into()),
            receiver: Some("b".into()),
            amount: Some(3.into()),
        };
        assert_eq!(
            Transaction::try_from(full.clone()),
            Ok(Transaction::new("a", "b", 3))
        );

        let missing_sender = NewTransaction {
            sender: None,
            ..full.clone()
        };
        assert_eq!(
            Transaction::try_from(missing_sender),
            Err(LedgerError::MalformedTransaction("sender"))
        );

        let missing_receiver = NewTransaction {
            receiver: None,
            ..full.clone()
        };
        assert_eq!(
            Transaction::try_from(missing_receiver),
            Err(LedgerError::MalformedTransaction("receiver"))
        );

        let missing_amount = NewTransaction {
            amount: None,
            ..full
        };
        assert_eq!(
            Transaction::try_from(missing_amount),
            Err(LedgerError::MalformedTransaction("amount"))
        );
    }

    #[test]
    fn any_json_number_is_an_amount() {
        for (body, amount) in [
            (r#"{"sender":"a","receiver":"b","amount":2.5}"#, "2.5"),
            (r#"{"sender":"a","receiver":"b","amount":-3}"#, "-3"),
            (r#"{"sender":"a","receiver":"b","amount":0}"#, "0"),
        ] {
            let tx: NewTransaction = serde_json::from_str(body).unwrap();
            let tx = Transaction::try_from(tx).unwrap();
            assert_eq!(tx.amount.to_string(), amount);
            assert_eq!(
                serde_json::to_string(&tx).unwrap(),
                format!(r#"{{"sender":"a","receiver":"b","amount":{amount}}}"#)
            );
        }
    }

    #[test]
    fn non_numeric_amount_is_rejected() {
        assert!(serde_json::from_str::<NewTransaction>(
            r#"{"sender":"a","receiver":"b","amount":"ten"}"#
        )
        .is_err());
    }

    #[test]
    fn new_transaction_from_partial_json() {
        let tx: NewTransaction = serde_json::from_str(r#"{"sender":"a","amount":5}"#).unwrap();
        assert_eq!(
            Transaction::try_from(tx),
            Err(LedgerError::MalformedTransaction("receiver"))
        );
    }

    #[test]
    fn block_hash_changes_with_proof() {
        let mut block = Block::genesis();
        let h1 = block.hash();
        block.proof += 1;
        assert_ne!(h1, block.hash());
    }
}
