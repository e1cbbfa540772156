//! Debugs a P2SH spend and prints the full step trace.
//!
//! Run with: `cargo run --example trace`

use bch_script_vm::crypto::hash160;
use bch_script_vm::hex::encode_hex;
use bch_script_vm::ops::standard_instruction_set;
use bch_script_vm::program::{debug_program, verify_program, AuthenticationProgram};
use bch_script_vm::state::TransactionContext;

fn main() {
    // 1. The redeem script: OP_1 OP_EQUAL (spendable by pushing a 1).
    let redeem_script = vec![0x51, 0x87];

    // 2. The locking script commits to HASH160(redeem script):
    //    OP_HASH160 <20-byte hash> OP_EQUAL
    let mut locking_script = vec![0xa9, 0x14];
    locking_script.extend_from_slice(&hash160(&redeem_script));
    locking_script.push(0x87);

    // 3. The unlocking script pushes the redeem script's argument, then
    //    the redeem script itself: OP_1 <redeem script>
    let mut unlocking_script = vec![0x51];
    unlocking_script.push(redeem_script.len() as u8);
    unlocking_script.extend_from_slice(&redeem_script);

    let program = AuthenticationProgram::new(
        unlocking_script,
        locking_script,
        TransactionContext::default(),
    );

    // 4. Trace all three passes: unlock, lock, redeem.
    let instruction_set = standard_instruction_set();
    for step in debug_program(&instruction_set, &program) {
        let stack: Vec<String> = step
            .state
            .stack
            .iter()
            .map(|element| format!("<{}>", encode_hex(element)))
            .collect();
        if step.asm.is_empty() {
            println!("── {}", step.description);
        } else {
            println!("  {:<28} stack: [{}]", step.asm, stack.join(" "));
        }
        if let Some(error) = step.state.error {
            println!("  error: {error}");
        }
    }

    // 5. The acceptance decision, without a trace.
    let authorized = verify_program(&instruction_set, &program);
    println!();
    println!("spend authorized: {authorized}");
}
