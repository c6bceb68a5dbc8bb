//! Example: two independently created registers are entangled by a CNOT.
//! The gate spans two real registers, so they are joined first; stepping back
//! through the session shows the layout before and after the merge.

use qregemu::{Command, EmulationConfig, ScriptBuilder, Session};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- qregemu Example: register merge and step-back ---");

    let script = ScriptBuilder::new()
        .add(Command::create(&[("alice", 1)]))
        .add(Command::create(&[("bob", 2)]))
        .add(Command::gate("H", &[("alice", 0)]))
        .add(Command::gate("CNOT", &[("alice", 0), ("bob", 1)]))
        .add(Command::measure("bob", 1))
        .build();

    let mut session = Session::new(script, EmulationConfig::seeded(7));
    while let Some(out) = session.step() {
        println!("{}\n", out);
        if let Some(merge) = &out.merge {
            println!("Joined {:?} into '{}'", merge.old_real_names, merge.new_real_name);
            println!("Joined state before the gate: {:?}\n", merge.pre_merge_joined_state);
        }
    }

    let emu = session.emulation();
    println!("alice -> {}", emu.real_name_of("alice")?);
    println!("bob   -> {}", emu.real_name_of("bob")?);
    for (name, register) in emu.nominal_registers() {
        println!("  {} = {}", name, register);
    }

    // Undo the measurement and the merge.
    session.step_back();
    session.step_back();
    let emu = session.emulation();
    println!("\nAfter stepping back twice:");
    for (name, register) in emu.real_registers() {
        println!("  {} ({} qubits):\n{}", name, register.size(), register);
    }
    assert_eq!(emu.real_registers().count(), 2);
    Ok(())
}
