//! Provides the tagged hashing, script tree construction and output key tweaking required to commit
//! to a set of leaf scripts in a taproot output, along with sighash helpers over the resulting
//! transactions.

use bitcoin::{
    consensus::encode,
    hashes::{sha256, Hash, HashEngine},
    key::TweakedPublicKey,
    sighash::{self, Prevouts, SighashCache},
    taproot::LeafVersion,
    ScriptBuf, TapLeafHash, TapNodeHash, TapSighash, TapSighashType, TapTweakHash, Transaction,
    TxOut,
};
use secp256k1::{Parity, XOnlyPublicKey, SECP256K1};

use crate::{constants::UNSPENDABLE_INTERNAL_KEY, errors::TaprootError, ordering::sort_scripts};

/// Tag for hashing leaf scripts.
pub const TAP_LEAF_TAG: &str = "TapLeaf";

/// Tag for hashing pairs of nodes in the script tree.
pub const TAP_BRANCH_TAG: &str = "TapBranch";

/// Computes `SHA256(SHA256(tag) || SHA256(tag) || msg)` as defined in
/// [BIP-340](https://github.com/bitcoin/bips/blob/master/bip-0340.mediawiki#design).
pub fn tagged_hash(tag: &str, msg: &[u8]) -> [u8; 32] {
    let tag_hash = sha256::Hash::hash(tag.as_bytes());

    let mut engine = sha256::Hash::engine();
    engine.input(tag_hash.as_byte_array());
    engine.input(tag_hash.as_byte_array());
    engine.input(msg);

    sha256::Hash::from_engine(engine).to_byte_array()
}

/// Computes the hash of a tapscript leaf.
///
/// The preimage is the leaf version followed by the compact-size prefixed script.
pub fn tap_leaf_hash(script: &ScriptBuf) -> TapLeafHash {
    let mut msg = vec![LeafVersion::TapScript.to_consensus()];
    msg.extend(encode::serialize(script));

    TapLeafHash::from_byte_array(tagged_hash(TAP_LEAF_TAG, &msg))
}

/// Computes the hash of a branch from its two children.
///
/// The children are sorted by their bytes before hashing so that the result is independent of the
/// order in which they are supplied.
pub fn tap_branch_hash(left: TapNodeHash, right: TapNodeHash) -> TapNodeHash {
    let (left, right) = if left.as_byte_array() <= right.as_byte_array() {
        (left, right)
    } else {
        (right, left)
    };

    let mut msg = [0u8; 64];
    msg[..32].copy_from_slice(left.as_byte_array());
    msg[32..].copy_from_slice(right.as_byte_array());

    TapNodeHash::from_byte_array(tagged_hash(TAP_BRANCH_TAG, &msg))
}

/// Computes the merkle root of the script tree over `scripts`, in the order supplied.
///
/// Leaves are paired up left to right at each level. An unpaired node at the end of a level is
/// promoted unchanged to the next level:
///
/// ```text
///            [Root]
///           /      \
///      [B(0,1)]     S2      ---> S2 was promoted from the deepest level
///      /      \
///    S0        S1
/// ```
///
/// Returns [`None`] if `scripts` is empty.
pub fn tap_merkle_root(scripts: &[ScriptBuf]) -> Option<TapNodeHash> {
    let mut level: Vec<TapNodeHash> = scripts
        .iter()
        .map(|script| TapNodeHash::from(tap_leaf_hash(script)))
        .collect();

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => tap_branch_hash(*left, *right),
                _ => pair[0],
            })
            .collect();
    }

    level.pop()
}

/// The result of committing to a set of leaf scripts in a taproot output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaprootCommitment {
    internal_key: XOnlyPublicKey,
    merkle_root: Option<TapNodeHash>,
    output_key: XOnlyPublicKey,
    output_key_parity: Parity,
}

impl TaprootCommitment {
    /// Gets the internal key of the output.
    pub const fn internal_key(&self) -> XOnlyPublicKey {
        self.internal_key
    }

    /// Gets the merkle root of the script tree, if the output has any leaves.
    pub const fn merkle_root(&self) -> Option<TapNodeHash> {
        self.merkle_root
    }

    /// Gets the (tweaked) output key that appears in the locking script.
    pub const fn output_key(&self) -> XOnlyPublicKey {
        self.output_key
    }

    /// Gets the parity of the output key.
    ///
    /// This goes into the control block when spending via a leaf.
    pub const fn output_key_parity(&self) -> Parity {
        self.output_key_parity
    }

    /// Generates the version 1 witness program over the output key.
    pub fn script_pubkey(&self) -> ScriptBuf {
        ScriptBuf::new_p2tr_tweaked(TweakedPublicKey::dangerous_assume_tweaked(self.output_key))
    }
}

/// Commits to the `scripts` in a taproot output with the given `internal_key`.
///
/// If no `internal_key` is provided, the [`static@UNSPENDABLE_INTERNAL_KEY`] is used so that the
/// output can only be spent via one of the `scripts`. The `scripts` are sorted canonically before
/// the tree is built, so any permutation of the same set yields the same output.
///
/// If `scripts` is empty, the internal key is used as the output key as-is.
///
/// # Errors
///
/// If tweaking the internal key with the merkle root fails.
pub fn commit_taproot(
    internal_key: Option<XOnlyPublicKey>,
    scripts: &[ScriptBuf],
) -> Result<TaprootCommitment, TaprootError> {
    let internal_key = internal_key.unwrap_or(*UNSPENDABLE_INTERNAL_KEY);

    let scripts = sort_scripts(scripts.to_vec());
    let Some(merkle_root) = tap_merkle_root(&scripts) else {
        return Ok(TaprootCommitment {
            internal_key,
            merkle_root: None,
            output_key: internal_key,
            output_key_parity: Parity::Even,
        });
    };

    let tweak = TapTweakHash::from_key_and_tweak(internal_key, Some(merkle_root)).to_scalar();
    let (output_key, output_key_parity) = internal_key.add_tweak(SECP256K1, &tweak)?;

    Ok(TaprootCommitment {
        internal_key,
        merkle_root: Some(merkle_root),
        output_key,
        output_key_parity,
    })
}

/// Generate a sighash message for a taproot `key` spending path at the `input_index` of
/// all `prevouts`.
pub fn create_key_spend_hash(
    sighash_cache: &mut SighashCache<&Transaction>,
    prevouts: Prevouts<'_, TxOut>,
    sighash_type: TapSighashType,
    input_index: usize,
) -> Result<TapSighash, sighash::TaprootError> {
    sighash_cache.taproot_key_spend_signature_hash(input_index, &prevouts, sighash_type)
}

/// Generate a sighash message for a taproot `script` spending path at the `input_index` of
/// all `prevouts`.
pub fn create_script_spend_hash(
    sighash_cache: &mut SighashCache<&Transaction>,
    script: &ScriptBuf,
    prevouts: Prevouts<'_, TxOut>,
    sighash_type: TapSighashType,
    input_index: usize,
) -> Result<TapSighash, sighash::TaprootError> {
    let leaf_hash = TapLeafHash::from_script(script, LeafVersion::TapScript);

    sighash_cache.taproot_script_spend_signature_hash(
        input_index,
        &prevouts,
        leaf_hash,
        sighash_type,
    )
}

#[cfg(test)]
mod tests {
    use bitcoin::{key::TapTweak, taproot::TaprootBuilder};
    use proptest::prelude::*;

    use super::*;
    use crate::{
        scripts::general::{checksig_csv_script, checksig_script},
        test_utils::{generate_pubkeys, pubkey_from_seed},
    };

    fn dummy_scripts(count: usize) -> Vec<ScriptBuf> {
        generate_pubkeys(count)
            .iter()
            .map(|pubkey| checksig_script(&pubkey.x_only_public_key().0))
            .collect()
    }

    #[test]
    fn test_tagged_hash_matches_bitcoin_leaf_hash() {
        for script in dummy_scripts(3) {
            assert_eq!(
                tap_leaf_hash(&script),
                TapLeafHash::from_script(&script, LeafVersion::TapScript)
            );
        }
    }

    #[test]
    fn test_branch_hash_matches_bitcoin_node_hash() {
        let scripts = dummy_scripts(2);
        let a = TapNodeHash::from(tap_leaf_hash(&scripts[0]));
        let b = TapNodeHash::from(tap_leaf_hash(&scripts[1]));

        assert_eq!(tap_branch_hash(a, b), TapNodeHash::from_node_hashes(a, b));
        assert_eq!(tap_branch_hash(a, b), tap_branch_hash(b, a));
    }

    #[test]
    fn test_merkle_root_promotes_odd_node() {
        let scripts = dummy_scripts(3);
        let leaves: Vec<TapNodeHash> = scripts
            .iter()
            .map(|script| TapNodeHash::from(tap_leaf_hash(script)))
            .collect();

        let expected = tap_branch_hash(tap_branch_hash(leaves[0], leaves[1]), leaves[2]);
        assert_eq!(tap_merkle_root(&scripts), Some(expected));

        assert_eq!(tap_merkle_root(&scripts[..1]), Some(leaves[0]));
        assert_eq!(tap_merkle_root(&[]), None);
    }

    #[test]
    fn test_merkle_root_matches_taproot_builder() {
        // S0 and S1 at depth 2, S2 at depth 1 is the shape produced by promotion.
        let scripts = dummy_scripts(3);
        let internal_key = *UNSPENDABLE_INTERNAL_KEY;

        let spend_info = TaprootBuilder::new()
            .add_leaf(2, scripts[0].clone())
            .and_then(|builder| builder.add_leaf(2, scripts[1].clone()))
            .and_then(|builder| builder.add_leaf(1, scripts[2].clone()))
            .expect("tree must be valid")
            .finalize(SECP256K1, internal_key)
            .expect("tree must be complete");

        assert_eq!(tap_merkle_root(&scripts), spend_info.merkle_root());
    }

    #[test]
    fn test_commitment_matches_bitcoin_tweak() {
        let pubkey = pubkey_from_seed(0x01).x_only_public_key().0;
        let scripts = vec![
            checksig_script(&pubkey),
            checksig_csv_script(&pubkey, 144),
        ];

        let commitment = commit_taproot(None, &scripts).expect("must commit");
        let merkle_root = commitment.merkle_root();

        let (expected_key, expected_parity) =
            (*UNSPENDABLE_INTERNAL_KEY).tap_tweak(SECP256K1, merkle_root);
        assert_eq!(commitment.output_key(), expected_key.to_inner());
        assert_eq!(commitment.output_key_parity(), expected_parity);
        assert_eq!(
            commitment.script_pubkey(),
            ScriptBuf::new_p2tr(SECP256K1, *UNSPENDABLE_INTERNAL_KEY, merkle_root)
        );
        assert!(commitment.script_pubkey().is_p2tr());
    }

    #[test]
    fn test_commitment_uses_provided_internal_key() {
        let internal_key = pubkey_from_seed(0x09).x_only_public_key().0;
        let scripts = dummy_scripts(1);

        let commitment = commit_taproot(Some(internal_key), &scripts).expect("must commit");
        assert_eq!(commitment.internal_key(), internal_key);

        let unspendable = commit_taproot(None, &scripts).expect("must commit");
        assert_eq!(unspendable.internal_key(), *UNSPENDABLE_INTERNAL_KEY);
        assert_ne!(commitment.script_pubkey(), unspendable.script_pubkey());
    }

    #[test]
    fn test_commitment_without_leaves_is_key_path_only() {
        let internal_key = pubkey_from_seed(0x04).x_only_public_key().0;

        let commitment = commit_taproot(Some(internal_key), &[]).expect("must commit");

        assert_eq!(commitment.merkle_root(), None);
        assert_eq!(commitment.output_key(), internal_key);
        assert_eq!(
            commitment.script_pubkey(),
            ScriptBuf::new_p2tr_tweaked(TweakedPublicKey::dangerous_assume_tweaked(internal_key))
        );
    }

    proptest! {
        #[test]
        fn prop_commitment_ignores_leaf_order(count in 1usize..8, rotation in 0usize..8) {
            let scripts = dummy_scripts(count);
            let mut shuffled = scripts.clone();
            shuffled.rotate_left(rotation % count);
            shuffled.reverse();

            prop_assert_eq!(
                commit_taproot(None, &scripts).expect("must commit"),
                commit_taproot(None, &shuffled).expect("must commit")
            );
        }
    }
}
