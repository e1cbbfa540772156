//! A Bitcoin Cash authentication-script virtual machine with a step-wise
//! debugger, built for education and tooling.
//!
//! An authentication program pairs the unlocking script a spender supplies
//! with the locking script of the output being spent. This crate executes
//! such programs against a fixed transaction context and decides whether
//! the input is authorized — and, for tooling, records every intermediate
//! machine state along the way.
//!
//! # Consensus warning
//!
//! **This crate is NOT consensus-compatible with any full node.**
//!
//! A reimplementation of the script VM cannot guarantee identical behavior
//! to production node software across all edge cases — number encoding
//! boundaries, error ordering, and other subtle behaviors that define
//! consensus.
//!
//! **Do not use this crate to validate real transactions or protect real
//! funds.**
//!
//! This crate is intended for:
//! - **Education** — learning how script authentication works internally
//! - **Tooling** — script inspection, debugging, and construction
//! - **Testing** — validating script logic before broadcast
//!
//! # What this crate implements
//!
//! - **Generic runtime**: an [`vm::InstructionSet`] is a 256-entry operator
//!   table plus three hooks; the same `step`/`evaluate`/`debug` plumbing
//!   drives the consensus instruction set and any purpose-built one.
//! - **The common opcodes**: all four push encodings (with minimal-push
//!   enforcement and the 520-byte element cap), the OP_N constants,
//!   OP_DUP, OP_EQUAL, OP_EQUALVERIFY, OP_VERIFY, OP_HASH160,
//!   OP_CODESEPARATOR, and OP_CHECKSIG.
//! - **The Bitcoin Cash signing serialization**: the replay-protected,
//!   BIP143-style preimage, with the ALL/NONE/SINGLE and ANYONECANPAY
//!   variants.
//! - **Program composition**: unlocking then locking script on a shared
//!   stack, with P2SH redeem-script re-execution as a third pass.
//! - **A debugger**: every pass can be traced step by step, each entry
//!   pairing a state snapshot with the instruction's rendering.
//!
//! # What is NOT implemented
//!
//! - Arithmetic, conditional, and stack-shuffling opcodes outside the set
//!   above
//! - Legacy (pre-fork) signature hashing, SegWit, Taproot
//! - Signature creation, transaction relay, or any network I/O
//!
//! # OP_CHECKSIG behavior
//!
//! By default OP_CHECKSIG validates both encodings (strict DER, low S,
//! permitted sighash byte; compressed or uncompressed key), computes the
//! real signing digest, and then accepts the signature without touching
//! the curve. With the `secp256k1` Cargo feature enabled and
//! [`ops::standard_instruction_set`], real ECDSA verification is performed
//! using the `secp256k1` crate. Custom providers can be wired through
//! [`ops::common_instruction_set`].
//!
//! # Quick example
//!
//! ```rust
//! use bch_script_vm::ops::standard_instruction_set;
//! use bch_script_vm::state::{CommonProgramState, TransactionContext};
//!
//! // OP_1 OP_1 OP_EQUAL
//! let script = vec![0x51, 0x51, 0x87];
//! let state = CommonProgramState::new(script, vec![], TransactionContext::default());
//! let result = standard_instruction_set().evaluate(&state);
//! assert_eq!(result.stack, vec![vec![0x01]]);
//! assert!(result.error.is_none());
//! ```
//!
//! # Feature flags
//!
//! | Feature     | Description                                        |
//! |-------------|----------------------------------------------------|
//! | `secp256k1` | Enables real ECDSA signature verification for      |
//! |             | OP_CHECKSIG via the `secp256k1` crate.             |

pub mod bytes;
pub mod crypto;
pub mod error;
pub mod hex;
pub mod num;
pub mod opcodes;
pub mod ops;
pub mod program;
pub mod sig;
pub mod sighash;
pub mod state;
pub mod tx;
pub mod vm;
