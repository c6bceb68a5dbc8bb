//! Example: Grover search over two input qubits with a table-defined oracle.
//! The oracle flips an ancilla prepared in |->, which kicks a -1 phase back
//! onto the marked input. One diffusion step then finds it with certainty.

use qregemu::{Command, Emulation, EmulationConfig, ScriptBuilder, TableSource};

fn diffusion(builder: ScriptBuilder) -> ScriptBuilder {
    builder.add_many([
        Command::gate("H", &[("x", 0)]),
        Command::gate("H", &[("x", 1)]),
        Command::gate("X", &[("x", 0)]),
        Command::gate("X", &[("x", 1)]),
        Command::gate("CZ", &[("x", 0), ("x", 1)]),
        Command::gate("X", &[("x", 0)]),
        Command::gate("X", &[("x", 1)]),
        Command::gate("H", &[("x", 0)]),
        Command::gate("H", &[("x", 1)]),
    ])
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- qregemu Example: Grover search (2 inputs, marked |11>) ---");

    let builder = ScriptBuilder::new()
        .add(Command::create(&[("x", 2), ("y", 1)]))
        .add(Command::define_oracle("marked", TableSource::Text("# input size\n2\n# marked\n3\n".to_string())))
        // Ancilla in |->, inputs in uniform superposition.
        .add(Command::gate("X", &[("y", 0)]))
        .add(Command::gate("H", &[("y", 0)]))
        .add(Command::gate("H", &[("x", 0)]))
        .add(Command::gate("H", &[("x", 1)]))
        .add(Command::apply_oracle("marked", "x", "y", 0));
    let script = diffusion(builder)
        .add(Command::measure("x", 0))
        .add(Command::measure("x", 1))
        .build();

    println!("\n{}", script);

    let mut emu = Emulation::with_config(EmulationConfig::seeded(2024));
    let mut bits = Vec::new();
    for command in script.commands() {
        let out = emu.run(command);
        println!("> {}\n{}\n", command, out);
        if !out.succeeded {
            return Err(out.status.into());
        }
        if let Command::Measure { .. } = command {
            bits.push(out.status);
        }
    }

    println!("Measurements: {:?}", bits);
    assert_eq!(bits, vec!["1", "1"]);
    println!("Success! The marked input |11> was found.");
    Ok(())
}
