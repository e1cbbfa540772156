//! The transaction model and the hash precomputation feeding the signing
//! serialization.

use crate::bytes::{encode_uint32_le, encode_uint64_le, encode_var_int};
use crate::crypto::hash256;
use crate::state::TransactionContext;

/// One input of a transaction: the outpoint it spends, the unlocking
/// script, and the sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub outpoint_transaction_hash: [u8; 32],
    pub outpoint_index: u32,
    pub unlocking_script: Vec<u8>,
    pub sequence_number: u32,
}

/// One output of a transaction: a value in satoshis and the locking
/// script that guards it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub value: u64,
    pub locking_script: Vec<u8>,
}

/// A transaction, as far as script validation is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    pub locktime: u32,
}

/// Double-SHA256 over every input's outpoint (txid, then index LE).
pub fn outpoints_hash(inputs: &[Input]) -> [u8; 32] {
    let mut serialized = Vec::with_capacity(inputs.len() * 36);
    for input in inputs {
        serialized.extend_from_slice(&input.outpoint_transaction_hash);
        serialized.extend_from_slice(&encode_uint32_le(input.outpoint_index));
    }
    hash256(&serialized)
}

/// Double-SHA256 over every input's sequence number (LE).
pub fn sequence_numbers_hash(inputs: &[Input]) -> [u8; 32] {
    let mut serialized = Vec::with_capacity(inputs.len() * 4);
    for input in inputs {
        serialized.extend_from_slice(&encode_uint32_le(input.sequence_number));
    }
    hash256(&serialized)
}

fn serialize_output(output: &Output) -> Vec<u8> {
    let mut serialized =
        Vec::with_capacity(8 + 9 + output.locking_script.len());
    serialized.extend_from_slice(&encode_uint64_le(output.value));
    serialized.extend_from_slice(&encode_var_int(output.locking_script.len() as u64));
    serialized.extend_from_slice(&output.locking_script);
    serialized
}

/// Double-SHA256 over every output's serialization (value LE, VarInt
/// script length, script).
pub fn outputs_hash(outputs: &[Output]) -> [u8; 32] {
    let mut serialized = Vec::new();
    for output in outputs {
        serialized.extend_from_slice(&serialize_output(output));
    }
    hash256(&serialized)
}

/// Double-SHA256 of the single output at `input_index`, for
/// SIGHASH_SINGLE-style signatures. Zero bytes when this input has no
/// matching output.
pub fn corresponding_output_hash(outputs: &[Output], input_index: usize) -> [u8; 32] {
    match outputs.get(input_index) {
        Some(output) => hash256(&serialize_output(output)),
        None => [0u8; 32],
    }
}

impl Transaction {
    /// Precomputes the external state OP_CHECKSIG signs for one input.
    ///
    /// `source_output` is the output this input spends (it lives in the
    /// funding transaction, not here). Returns `None` if `input_index`
    /// does not name an input.
    pub fn context_for_input(
        &self,
        input_index: usize,
        source_output: &Output,
        block_height: u32,
        block_time: u32,
    ) -> Option<TransactionContext> {
        let input = self.inputs.get(input_index)?;
        Some(TransactionContext {
            block_height,
            block_time,
            version: self.version,
            locktime: self.locktime,
            transaction_outpoints_hash: outpoints_hash(&self.inputs),
            transaction_outputs_hash: outputs_hash(&self.outputs),
            transaction_sequence_numbers_hash: sequence_numbers_hash(&self.inputs),
            corresponding_output_hash: corresponding_output_hash(&self.outputs, input_index),
            outpoint_transaction_hash: input.outpoint_transaction_hash,
            outpoint_index: input.outpoint_index,
            outpoint_value: source_output.value,
            sequence_number: input.sequence_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_transaction() -> Transaction {
        Transaction {
            version: 2,
            inputs: vec![
                Input {
                    outpoint_transaction_hash: [0xaa; 32],
                    outpoint_index: 0,
                    unlocking_script: vec![0x51],
                    sequence_number: 0xffff_ffff,
                },
                Input {
                    outpoint_transaction_hash: [0xbb; 32],
                    outpoint_index: 7,
                    unlocking_script: vec![],
                    sequence_number: 0xffff_fffe,
                },
            ],
            outputs: vec![Output {
                value: 1000,
                locking_script: vec![0x87],
            }],
            locktime: 0,
        }
    }

    #[test]
    fn outpoints_hash_covers_all_inputs() {
        let tx = sample_transaction();
        let mut serialized = Vec::new();
        serialized.extend_from_slice(&[0xaa; 32]);
        serialized.extend_from_slice(&[0, 0, 0, 0]);
        serialized.extend_from_slice(&[0xbb; 32]);
        serialized.extend_from_slice(&[7, 0, 0, 0]);
        assert_eq!(outpoints_hash(&tx.inputs), hash256(&serialized));
    }

    #[test]
    fn sequence_numbers_hash_is_le_concat() {
        let tx = sample_transaction();
        let serialized = [
            0xff, 0xff, 0xff, 0xff, //
            0xfe, 0xff, 0xff, 0xff,
        ];
        assert_eq!(sequence_numbers_hash(&tx.inputs), hash256(&serialized));
    }

    #[test]
    fn outputs_hash_uses_var_int_lengths() {
        let tx = sample_transaction();
        let mut serialized = Vec::new();
        serialized.extend_from_slice(&[0xe8, 0x03, 0, 0, 0, 0, 0, 0]);
        serialized.push(0x01);
        serialized.push(0x87);
        assert_eq!(outputs_hash(&tx.outputs), hash256(&serialized));
    }

    #[test]
    fn corresponding_output_present_and_missing() {
        let tx = sample_transaction();
        assert_eq!(
            corresponding_output_hash(&tx.outputs, 0),
            hash256(&serialize_output(&tx.outputs[0]))
        );
        // input 1 has no matching output
        assert_eq!(corresponding_output_hash(&tx.outputs, 1), [0u8; 32]);
    }

    #[test]
    fn context_for_input_collects_per_input_fields() {
        let tx = sample_transaction();
        let source = Output {
            value: 5000,
            locking_script: vec![0xac],
        };
        let context = tx.context_for_input(1, &source, 100, 1_600_000_000).unwrap();
        assert_eq!(context.version, 2);
        assert_eq!(context.outpoint_transaction_hash, [0xbb; 32]);
        assert_eq!(context.outpoint_index, 7);
        assert_eq!(context.outpoint_value, 5000);
        assert_eq!(context.sequence_number, 0xffff_fffe);
        assert_eq!(context.corresponding_output_hash, [0u8; 32]);
        assert_eq!(context.transaction_outpoints_hash, outpoints_hash(&tx.inputs));
    }

    #[test]
    fn context_for_missing_input() {
        let tx = sample_transaction();
        let source = Output {
            value: 0,
            locking_script: vec![],
        };
        assert!(tx.context_for_input(2, &source, 0, 0).is_none());
    }
}
