//! Block digests.
//!
//! A block is hashed over compact JSON with every object's keys in
//! lexicographic order. The digest of block `n` is embedded in block `n + 1`
//! and recomputed by every validator, so the byte layout must never depend on
//! how the block was built or which node built it.

use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::{Block, Transaction};

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn transaction_value(tx: &Transaction) -> Value {
    json!({
        "amount": tx.amount,
        "receiver": tx.receiver,
        "sender": tx.sender,
    })
}

fn block_value(block: &Block) -> Value {
    let txs: Vec<Value> = block.transactions.iter().map(transaction_value).collect();
    json!({
        "index": block.index,
        "previous_hash": block.previous_hash,
        "proof": block.proof,
        "timestamp": block.timestamp,
        "transactions": txs,
    })
}

/// Canonical byte form of a block: compact JSON, keys sorted at every level.
pub fn canonical_bytes(block: &Block) -> Vec<u8> {
    // Keys are listed sorted above and serde_json's default map keeps them sorted.
    block_value(block).to_string().into_bytes()
}

/// Hex digest of a block, as stored in the next block's `previous_hash`.
pub fn hash_block(block: &Block) -> String {
    sha256_hex(&canonical_bytes(block))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HASH_HEX_SIZE;

    fn sample_block() -> Block {
        Block {
            index: 2,
            timestamp: 1_600_000_000,
            proof: 533,
            previous_hash: "ab".repeat(32),
            transactions: vec![
                Transaction::new("alice", "bob", 10),
                Transaction::new("bob", "carol", 5),
            ],
        }
    }

    #[test]
    fn canonical_bytes_sort_keys() {
        let block = Block {
            index: 1,
            timestamp: 7,
            proof: 1,
            previous_hash: "0".into(),
            transactions: vec![Transaction::new("a", "b", 3)],
        };
        let text = String::from_utf8(canonical_bytes(&block)).unwrap();
        assert_eq!(
            text,
            r#"{"index":1,"previous_hash":"0","proof":1,"timestamp":7,"transactions":[{"amount":3,"receiver":"b","sender":"a"}]}"#
        );
    }

    #[test]
    fn sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hash_is_hex_and_deterministic() {
        let block = sample_block();
        let h1 = hash_block(&block);
        let h2 = hash_block(&block.clone());
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), HASH_HEX_SIZE);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn hash_matches_after_json_round_trip() {
        // A peer sees the block only through its wire form.
        let block = sample_block();
        let wire = serde_json::to_string(&block).unwrap();
        let received: Block = serde_json::from_str(&wire).unwrap();
        assert_eq!(hash_block(&block), hash_block(&received));
    }

    #[test]
    fn non_integer_amounts_survive_the_wire() {
        let mut block = sample_block();
        block.transactions[0].amount = serde_json::Number::from_f64(2.5).unwrap();
        block.transactions[1].amount = (-3).into();
        let text = String::from_utf8(canonical_bytes(&block)).unwrap();
        assert!(text.contains(r#"{"amount":2.5,"receiver":"bob","sender":"alice"}"#));
        assert!(text.contains(r#"{"amount":-3,"receiver":"carol","sender":"bob"}"#));

        let wire = serde_json::to_string(&block).unwrap();
        let received: Block = serde_json::from_str(&wire).unwrap();
        assert_eq!(received, block);
        assert_eq!(hash_block(&received), hash_block(&block));
        assert_ne!(hash_block(&block), hash_block(&sample_block()));
    }

    #[test]
    fn wire_key_order_does_not_matter() {
        let a = r#"{"index":3,"timestamp":9,"proof":4,"previous_hash":"x","transactions":[{"sender":"s","receiver":"r","amount":1}]}"#;
        let b = r#"{"transactions":[{"amount":1,"receiver":"r","sender":"s"}],"previous_hash":"x","proof":4,"timestamp":9,"index":3}"#;
        let a: Block = serde_json::from_str(a).unwrap();
        let b: Block = serde_json::from_str(b).unwrap();
        assert_eq!(hash_block(&a), hash_block(&b));
    }

    #[test]
    fn every_field_feeds_the_hash() {
        let base = sample_block();
        let original = hash_block(&base);

        let mut b = base.clone();
        b.index += 1;
        assert_ne!(hash_block(&b), original);

        let mut b = base.clone();
        b.timestamp += 1;
        assert_ne!(hash_block(&b), original);

        let mut b = base.clone();
        b.proof += 1;
        assert_ne!(hash_block(&b), original);

        let mut b = base.clone();
        b.previous_hash.push('0');
        assert_ne!(hash_block(&b), original);

        let mut b = base.clone();
        b.transactions[1].amount = 6.into();
        assert_ne!(hash_block(&b), original);

        let mut b = base.clone();
        b.transactions.swap(0, 1);
        assert_ne!(hash_block(&b), original);
    }
}
