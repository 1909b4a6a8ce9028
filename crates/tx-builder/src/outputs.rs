//! This module contains the taproot outputs created by the Ark transactions.
//!
//! None of these outputs can be spent via the key path. Their internal key is the
//! [`static@UNSPENDABLE_INTERNAL_KEY`] and every spending condition is a leaf script.

use ark_tx_primitives::{
    constants::UNSPENDABLE_INTERNAL_KEY,
    errors::{AggError, TaprootError},
    key_agg::aggregated_xonly_pubkey,
    scripts::prelude::*,
};
use bitcoin::{Amount, ScriptBuf, TxOut};
use secp256k1::{PublicKey, XOnlyPublicKey};

/// A taproot output that commits to a set of leaf scripts.
pub trait TaprootOutput {
    /// Returns the internal key of the output.
    ///
    /// The key will be unspendable for outputs without a key path spend.
    fn internal_key(&self) -> XOnlyPublicKey {
        *UNSPENDABLE_INTERNAL_KEY
    }

    /// Generates the leaf scripts of the output.
    fn leaf_scripts(&self) -> Vec<ScriptBuf>;

    /// Computes the taproot commitment of the output.
    fn commitment(&self) -> Result<TaprootCommitment, TaprootError> {
        commit_taproot(Some(self.internal_key()), &self.leaf_scripts())
    }

    /// Generates the locking script of the output.
    fn script_pubkey(&self) -> Result<ScriptBuf, TaprootError> {
        Ok(self.commitment()?.script_pubkey())
    }

    /// Generates the transaction output that locks `value` in this output.
    fn tx_out(&self, value: Amount) -> Result<TxOut, TaprootError> {
        Ok(TxOut {
            value,
            script_pubkey: self.script_pubkey()?,
        })
    }
}

/// The output of a boarding transaction.
///
/// # Spending conditions
///
/// - cooperative: a signature of the aggregate of the user and the operator keys.
/// - timeout: a signature of the user after `timeout_blocks` blocks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BoardingOutput {
    user_pubkey: XOnlyPublicKey,
    cooperative_pubkey: XOnlyPublicKey,
    timeout_blocks: u16,
}

impl BoardingOutput {
    /// Creates a boarding output for the given user and operator.
    ///
    /// # Errors
    ///
    /// If the two keys cannot be aggregated.
    pub fn new(
        user_pubkey: PublicKey,
        operator_pubkey: PublicKey,
        timeout_blocks: u16,
    ) -> Result<Self, AggError> {
        let cooperative_pubkey = aggregated_xonly_pubkey([user_pubkey, operator_pubkey])?;

        Ok(Self {
            user_pubkey: user_pubkey.x_only_public_key().0,
            cooperative_pubkey,
            timeout_blocks,
        })
    }

    /// Returns the aggregated key of the cooperative path.
    pub const fn cooperative_pubkey(&self) -> XOnlyPublicKey {
        self.cooperative_pubkey
    }

    /// Returns the relative timelock of the timeout path.
    pub const fn timeout_blocks(&self) -> u16 {
        self.timeout_blocks
    }

    /// Generates the leaf script of the cooperative path.
    pub fn cooperative_script(&self) -> ScriptBuf {
        checksig_script(&self.cooperative_pubkey)
    }

    /// Generates the leaf script of the timeout path.
    pub fn timeout_script(&self) -> ScriptBuf {
        checksig_csv_script(&self.user_pubkey, self.timeout_blocks)
    }
}

impl TaprootOutput for BoardingOutput {
    fn leaf_scripts(&self) -> Vec<ScriptBuf> {
        vec![self.cooperative_script(), self.timeout_script()]
    }
}

/// The batch output of a commitment transaction.
///
/// # Spending conditions
///
/// - sweep: a signature of the operator once the chain reaches `batch_expiry`.
/// - unroll: a signature of the aggregate of all user keys in the batch.
///
/// A batch without users has no unroll path. Its tree then holds the sweep leaf twice.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BatchOutput {
    operator_pubkey: XOnlyPublicKey,
    unroll_pubkey: Option<XOnlyPublicKey>,
    batch_expiry: u32,
}

impl BatchOutput {
    /// Creates a batch output for the given operator and users.
    ///
    /// # Errors
    ///
    /// If the `user_pubkeys` cannot be aggregated.
    pub fn new(
        operator_pubkey: PublicKey,
        user_pubkeys: &[PublicKey],
        batch_expiry: u32,
    ) -> Result<Self, AggError> {
        let unroll_pubkey = if user_pubkeys.is_empty() {
            None
        } else {
            Some(aggregated_xonly_pubkey(user_pubkeys.iter().copied())?)
        };

        Ok(Self {
            operator_pubkey: operator_pubkey.x_only_public_key().0,
            unroll_pubkey,
            batch_expiry,
        })
    }

    /// Returns the aggregated key of the users, if there are any.
    pub const fn unroll_pubkey(&self) -> Option<XOnlyPublicKey> {
        self.unroll_pubkey
    }

    /// Returns the absolute height at which the operator may sweep the batch.
    pub const fn batch_expiry(&self) -> u32 {
        self.batch_expiry
    }

    /// Generates the leaf script of the sweep path.
    pub fn sweep_script(&self) -> ScriptBuf {
        checksig_cltv_script(&self.operator_pubkey, self.batch_expiry)
    }

    /// Generates the leaf script of the unroll path.
    ///
    /// This is the sweep script if the batch has no users.
    pub fn unroll_script(&self) -> ScriptBuf {
        match &self.unroll_pubkey {
            Some(unroll_pubkey) => checksig_script(unroll_pubkey),
            None => self.sweep_script(),
        }
    }
}

impl TaprootOutput for BatchOutput {
    fn leaf_scripts(&self) -> Vec<ScriptBuf> {
        vec![self.sweep_script(), self.unroll_script()]
    }
}

/// An output that only the operator can spend.
///
/// Used for the connector output of a commitment transaction and for the output of a forfeit
/// transaction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct OperatorOutput {
    operator_pubkey: XOnlyPublicKey,
}

impl OperatorOutput {
    /// Creates an output for the given operator.
    pub fn new(operator_pubkey: PublicKey) -> Self {
        Self {
            operator_pubkey: operator_pubkey.x_only_public_key().0,
        }
    }

    /// Generates the only leaf script of the output.
    pub fn operator_script(&self) -> ScriptBuf {
        checksig_script(&self.operator_pubkey)
    }
}

impl TaprootOutput for OperatorOutput {
    fn leaf_scripts(&self) -> Vec<ScriptBuf> {
        vec![self.operator_script()]
    }
}

#[cfg(test)]
mod tests {
    use ark_tx_test_utils::{bitcoin::prop_test_generators::arb_pubkey, prelude::*};
    use bitcoin::{taproot::TaprootBuilder, TapNodeHash};
    use proptest::prelude::*;
    use secp256k1::SECP256K1;

    use super::*;

    fn xonly(pubkey: PublicKey) -> XOnlyPublicKey {
        pubkey.x_only_public_key().0
    }

    #[test]
    fn boarding_output_leaves() {
        let user = pubkey_from_seed(0x01);
        let operator = pubkey_from_seed(0x02);
        let output = BoardingOutput::new(user, operator, 144).expect("keys must aggregate");

        let expected_agg = aggregated_xonly_pubkey([user, operator]).expect("keys must aggregate");
        assert_eq!(output.cooperative_pubkey(), expected_agg);
        assert_eq!(output.cooperative_script(), checksig_script(&expected_agg));
        assert_eq!(output.timeout_script(), checksig_csv_script(&xonly(user), 144));
        assert_eq!(output.internal_key(), *UNSPENDABLE_INTERNAL_KEY);
    }

    #[test]
    fn boarding_output_matches_bitcoin_taproot_builder() {
        let output = BoardingOutput::new(pubkey_from_seed(0x03), pubkey_from_seed(0x04), 10)
            .expect("keys must aggregate");

        let spend_info = TaprootBuilder::new()
            .add_leaf(1, output.cooperative_script())
            .expect("leaf must be valid")
            .add_leaf(1, output.timeout_script())
            .expect("leaf must be valid")
            .finalize(SECP256K1, *UNSPENDABLE_INTERNAL_KEY)
            .expect("tree must be complete");

        let expected = ScriptBuf::new_p2tr_tweaked(spend_info.output_key());
        assert_eq!(output.script_pubkey().expect("must commit"), expected);
    }

    #[test]
    fn batch_output_with_users() {
        let operator = pubkey_from_seed(0x01);
        let users = [pubkey_from_seed(0x02), pubkey_from_seed(0x03)];

        let output = BatchOutput::new(operator, &users, 800_000).expect("keys must aggregate");

        let unroll = aggregated_xonly_pubkey(users).expect("keys must aggregate");
        assert_eq!(output.unroll_pubkey(), Some(unroll));
        assert_eq!(output.unroll_script(), checksig_script(&unroll));
        assert_eq!(
            output.sweep_script(),
            checksig_cltv_script(&xonly(operator), 800_000)
        );
        assert_eq!(output.leaf_scripts().len(), 2);
    }

    #[test]
    fn batch_output_without_users_duplicates_sweep() {
        let output =
            BatchOutput::new(pubkey_from_seed(0x01), &[], 800_000).expect("no keys to aggregate");

        assert_eq!(output.unroll_pubkey(), None);
        assert_eq!(output.unroll_script(), output.sweep_script());

        let commitment = output.commitment().expect("must commit");
        let leaf = TapNodeHash::from(tap_leaf_hash(&output.sweep_script()));
        assert_eq!(
            commitment.merkle_root(),
            Some(tap_branch_hash(leaf, leaf)),
            "the tree must hold the sweep leaf twice"
        );
    }

    #[test]
    fn batch_output_depends_on_users() {
        let operator = pubkey_from_seed(0x01);

        let with_one = BatchOutput::new(operator, &[pubkey_from_seed(0x02)], 100)
            .expect("keys must aggregate");
        let with_two = BatchOutput::new(
            operator,
            &[pubkey_from_seed(0x02), pubkey_from_seed(0x03)],
            100,
        )
        .expect("keys must aggregate");

        assert_ne!(
            with_one.script_pubkey().expect("must commit"),
            with_two.script_pubkey().expect("must commit")
        );
    }

    #[test]
    fn operator_output() {
        let operator = pubkey_from_seed(0x05);
        let output = OperatorOutput::new(operator);

        assert_eq!(output.leaf_scripts(), vec![checksig_script(&xonly(operator))]);

        let tx_out = output.tx_out(Amount::from_sat(1_000)).expect("must commit");
        assert_eq!(tx_out.value, Amount::from_sat(1_000));
        assert!(tx_out.script_pubkey.is_p2tr());

        let commitment = output.commitment().expect("must commit");
        assert_eq!(
            commitment.merkle_root(),
            Some(TapNodeHash::from(tap_leaf_hash(&output.operator_script())))
        );
    }

    proptest! {
        #[test]
        fn prop_batch_output_ignores_user_order(
            (users, shuffled) in prop::collection::vec(arb_pubkey(), 1..8)
                .prop_flat_map(|users| (Just(users.clone()), Just(users).prop_shuffle())),
            operator in arb_pubkey(),
        ) {
            let output = BatchOutput::new(operator, &users, 800_000).expect("keys must aggregate");
            let shuffled_output =
                BatchOutput::new(operator, &shuffled, 800_000).expect("keys must aggregate");

            prop_assert_eq!(
                output.script_pubkey().expect("must commit"),
                shuffled_output.script_pubkey().expect("must commit")
            );
        }
    }
}
