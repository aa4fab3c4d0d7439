use crate::{sha256, Hash, Transaction, ZERO_HASH};

fn leaf(tx: &Transaction) -> Hash {
    sha256(&[tx.content_bytes().as_slice(), tx.hash.as_slice()])
}

/// Merkle root over the ordered transactions. An odd node at the end of a level
/// is paired with itself, and the leaf count is hashed into the final root so
/// that `[a, b, c]` and `[a, b, c, c]` differ. An empty list has the all-zero
/// root.
pub fn merkle_root(txs: &[Transaction]) -> Hash {
    if txs.is_empty() {
        return ZERO_HASH;
    }
    let count = (txs.len() as u64).to_le_bytes();
    let mut level: Vec<Hash> = txs.iter().map(leaf).collect();

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [a, b] => sha256(&[a.as_slice(), b.as_slice()]),
                [a] => sha256(&[a.as_slice(), a.as_slice()]),
                _ => unreachable!("chunks(2) yields one or two items"),
            })
            .collect();
    }
    sha256(&[count.as_slice(), level[0].as_slice()])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txs(n: usize) -> Vec<Transaction> {
        (0..n)
            .map(|i| {
                Transaction::new(
                    format!("User{i}"),
                    format!("User{}", i + 1),
                    i as u64,
                    1,
                    1_600_000_000 + i as u64 * 100,
                )
            })
            .collect()
    }

    #[test]
    fn merkle_root_empty_txs() {
        assert_eq!(merkle_root(&[]), [0u8; 32]);
    }

    fn with_count(n: u64, root: Hash) -> Hash {
        sha256(&[n.to_le_bytes().as_slice(), root.as_slice()])
    }

    #[test]
    fn merkle_root_single_tx_wraps_its_leaf() {
        let t = txs(1);
        assert_eq!(merkle_root(&t), with_count(1, leaf(&t[0])));
    }

    #[test]
    fn merkle_root_two_txs() {
        let t = txs(2);
        let tree = sha256(&[leaf(&t[0]).as_slice(), leaf(&t[1]).as_slice()]);
        assert_eq!(merkle_root(&t), with_count(2, tree));
    }

    #[test]
    fn merkle_root_three_txs_duplicates_tail() {
        let t = txs(3);
        let left = sha256(&[leaf(&t[0]).as_slice(), leaf(&t[1]).as_slice()]);
        let right = sha256(&[leaf(&t[2]).as_slice(), leaf(&t[2]).as_slice()]);
        let tree = sha256(&[left.as_slice(), right.as_slice()]);
        assert_eq!(merkle_root(&t), with_count(3, tree));
    }

    #[test]
    fn repeating_the_odd_tail_changes_root() {
        for n in [1, 3, 5, 7] {
            let mut t = txs(n);
            let root = merkle_root(&t);
            t.push(t[n - 1].clone());
            assert_ne!(merkle_root(&t), root, "{n} leaves");
        }
    }

    #[test]
    fn order_matters() {
        let mut t = txs(4);
        let root = merkle_root(&t);
        t.swap(1, 2);
        assert_ne!(merkle_root(&t), root);
    }

    #[test]
    fn tampered_field_changes_root_even_with_stale_hash() {
        let mut t = txs(5);
        let root = merkle_root(&t);
        t[3].fee += 1;
        assert_ne!(merkle_root(&t), root);
    }

    #[test]
    fn merkle_root_one_thousand_txs_is_stable() {
        let t = txs(1000);
        assert_eq!(merkle_root(&t), merkle_root(&t.clone()));
        assert_ne!(merkle_root(&t), [0u8; 32]);
    }
}
