// tests/emulation_tests.rs

use qregemu::{
    validate_state, Amplitude, Command, Emulation, EmulationConfig, EmulatorError, NominalSpec, TableSource,
};
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::io::Write;

fn seeded(seed: u64) -> Emulation {
    Emulation::with_config(EmulationConfig::seeded(seed))
}

// Runs a command and fails the test with its status if it did not succeed.
fn run_ok(emu: &mut Emulation, command: Command) -> String {
    let out = emu.run(&command);
    assert!(out.succeeded, "{} failed: {}", command, out.status);
    out.status
}

fn one() -> Amplitude {
    Amplitude::new(1.0, 0.0)
}

#[test]
fn test_flip_measure_then_merge() -> Result<(), EmulatorError> {
    let mut emu = seeded(1);
    run_ok(&mut emu, Command::create(&[("r", 1)]));
    run_ok(&mut emu, Command::gate("X", &[("r", 0)]));
    assert_eq!(emu.register_state("r")?.to_map(), BTreeMap::from([(1, one())]));

    assert_eq!(emu.measure("r", 0)?, 1);
    assert_eq!(emu.register_state("r")?.to_map(), BTreeMap::from([(1, one())]));

    run_ok(&mut emu, Command::create(&[("b", 1)]));
    let out = emu.run(&Command::gate("SWAP", &[("r", 0), ("b", 0)]));
    assert!(out.succeeded, "{}", out.status);
    let merge = out.merge.expect("r and b started on different real registers");

    let joined = emu.real_register_state(&merge.new_real_name)?;
    assert_eq!(joined.qubit_count(), 2);
    // Before the swap r (upper bit) held 1: |10>. After it, b does: |01>.
    assert_eq!(merge.pre_merge_joined_state, BTreeMap::from([(2, one())]));
    assert_eq!(joined.to_map(), BTreeMap::from([(1, one())]));
    assert_eq!(emu.real_name_of("r")?, merge.new_real_name);
    assert_eq!(emu.real_name_of("b")?, merge.new_real_name);
    assert!(std::ptr::eq(emu.register_state("r")?, emu.register_state("b")?));
    Ok(())
}

#[test]
fn test_gate_sequence_keeps_normalization() -> Result<(), EmulatorError> {
    let mut emu = seeded(2);
    emu.create_register(Some("main"), Some(4), &[NominalSpec::new("q", 3), NominalSpec::new("a", 1)])?;
    let sequence = [
        Command::gate("H", &[("q", 0)]),
        Command::gate("H", &[("q", 2)]),
        Command::gate("CNOT", &[("q", 0), ("a", 0)]),
        Command::phase_gate("P", PI / 3.0, &[("q", 1)]),
        Command::gate("T", &[("q", 2)]),
        Command::gate("INC", &[("q", 0)]),
        Command::gate("CCX", &[("q", 0), ("q", 2), ("q", 1)]),
        Command::gate("Y", &[("a", 0)]),
        Command::phase_gate("CP", 0.25, &[("a", 0), ("q", 0)]),
        Command::gate("CSWAP", &[("a", 0), ("q", 1), ("q", 2)]),
        Command::gate("DEC", &[("a", 0)]),
        Command::gate("S", &[("q", 1)]),
        Command::gate("Z", &[("q", 0)]),
    ];
    for command in sequence {
        run_ok(&mut emu, command);
        validate_state(emu.real_register_state("main")?)?;
    }
    Ok(())
}

#[test]
fn test_increment_wraps_whole_real_register() -> Result<(), EmulatorError> {
    let mut emu = seeded(3);
    emu.create_register(Some("R"), None, &[NominalSpec::new("hi", 1), NominalSpec::new("lo", 1)])?;
    for expected in [1u64, 2, 3, 0] {
        run_ok(&mut emu, Command::gate("INC", &[("lo", 0)]));
        assert_eq!(emu.real_register_state("R")?.to_map(), BTreeMap::from([(expected, one())]));
    }
    run_ok(&mut emu, Command::gate("DEC", &[("hi", 0)]));
    assert_eq!(emu.real_register_state("R")?.to_map(), BTreeMap::from([(3, one())]));
    Ok(())
}

#[test]
fn test_oracle_truth_table_from_file() -> Result<(), EmulatorError> {
    let mut table = tempfile::NamedTempFile::new()?;
    writeln!(table, "# AND of two inputs")?;
    writeln!(table, "2")?;
    writeln!(table)?;
    writeln!(table, "3")?;

    for input in 0..4u64 {
        let mut emu = seeded(4);
        // x occupies bits 1..3, y is bit 0.
        run_ok(&mut emu, Command::create(&[("x", 2), ("y", 1)]));
        run_ok(&mut emu, Command::define_oracle("and", TableSource::Path(table.path().to_path_buf())));
        for bit in 0..2 {
            if (input >> bit) & 1 == 1 {
                run_ok(&mut emu, Command::gate("X", &[("x", bit as usize)]));
            }
        }

        run_ok(&mut emu, Command::apply_oracle("and", "x", "y", 0));
        let flipped = (input << 1) | u64::from(input == 3);
        assert_eq!(emu.register_state("y")?.to_map(), BTreeMap::from([(flipped, one())]), "input {}", input);
        assert_eq!(emu.measure("y", 0)?, u8::from(input == 3));

        run_ok(&mut emu, Command::apply_oracle("and", "x", "y", 0));
        assert_eq!(emu.register_state("y")?.to_map(), BTreeMap::from([(input << 1, one())]));
    }
    Ok(())
}

#[test]
fn test_oracle_on_superposition_records_trace() -> Result<(), EmulatorError> {
    let mut emu = seeded(5);
    emu.create_register(Some("R"), None, &[NominalSpec::new("x", 1), NominalSpec::new("anc", 1)])?;
    emu.define_oracle_from_table("id", &TableSource::Text("1\n1\n".to_string()))?;
    run_ok(&mut emu, Command::gate("H", &[("x", 0)]));
    run_ok(&mut emu, Command::apply_oracle("id", "x", "anc", 0));

    let state = emu.real_register_state("R")?;
    assert_eq!(state.active_states().iter().copied().collect::<Vec<_>>(), vec![0, 3]);
    let trace = emu.last_gate_trace().expect("oracle application records a trace");
    assert_eq!(trace.len(), 2);
    assert!(trace.contribution(2, 3).is_some());
    assert_eq!(trace.targets(2).map(|to| to.keys().copied().collect::<Vec<_>>()), Some(vec![3]));
    assert!(trace.targets(1).is_none());
    assert!(trace.contribution(0, 0).is_some());
    Ok(())
}

#[test]
fn test_oracle_definition_errors_surface_in_status() -> Result<(), EmulatorError> {
    let mut emu = seeded(6);
    let missing = emu.run(&Command::define_oracle("f", TableSource::Path("/no/such/oracle.csv".into())));
    assert!(!missing.succeeded);
    assert!(missing.status.starts_with("I/O error"), "{}", missing.status);

    let out_of_range = emu.run(&Command::define_oracle("f", TableSource::Text("2\n4\n".to_string())));
    assert!(!out_of_range.succeeded);
    assert!(emu.oracle("f").is_none());

    emu.define_oracle_from_table("f", &TableSource::Entries(vec![2, 1]))?;
    emu.define_oracle_from_table("f", &TableSource::Entries(vec![3, 6]))?;
    let redefined = emu.oracle("f").expect("f is defined");
    assert_eq!(redefined.input_size, 3);
    assert!(redefined.evaluate(6));
    Ok(())
}

#[test]
fn test_run_reports_errors_without_panicking() {
    let mut emu = seeded(7);
    run_ok(&mut emu, Command::create(&[("q", 2)]));
    let before = emu.real_registers().map(|(_, reg)| reg.clone()).collect::<Vec<_>>();

    let failures = [
        Command::gate("FOO", &[("q", 0)]),
        Command::gate("X", &[("q", 2)]),
        Command::gate("X", &[("nope", 0)]),
        Command::gate("CNOT", &[("q", 1), ("q", 1)]),
        Command::gate("P", &[("q", 0)]),
        Command::gate("H", &[]),
        Command::measure("q", 5),
        Command::sample("ghost", 0),
        Command::apply_oracle("undefined", "q", "q", 0),
        Command::create(&[("q", 1)]),
        Command::create(&[]),
    ];
    for command in failures {
        let out = emu.run(&command);
        assert!(!out.succeeded, "{} should fail", command);
        assert!(out.merge.is_none());
        assert!(out.to_string().starts_with("Error: "));
    }
    let after = emu.real_registers().map(|(_, reg)| reg.clone()).collect::<Vec<_>>();
    assert_eq!(before, after);
    assert!(emu.last_gate_trace().is_none());
}

#[test]
fn test_sampling_statistics_and_collapse() -> Result<(), EmulatorError> {
    let mut emu = seeded(8);
    run_ok(&mut emu, Command::create(&[("q", 1)]));
    run_ok(&mut emu, Command::gate("H", &[("q", 0)]));

    let mut ones = 0;
    for _ in 0..400 {
        ones += usize::from(emu.sample("q", 0)?);
    }
    assert!(ones > 120 && ones < 280, "{} ones out of 400", ones);
    // Sampling never collapses.
    assert_eq!(emu.register_state("q")?.len(), 2);

    let first = emu.measure("q", 0)?;
    assert_eq!(emu.register_state("q")?.len(), 1);
    for _ in 0..10 {
        assert_eq!(emu.measure("q", 0)?, first);
    }
    Ok(())
}

#[test]
fn test_clone_is_independent() -> Result<(), EmulatorError> {
    let mut emu = seeded(9);
    run_ok(&mut emu, Command::create(&[("q", 2)]));
    let snapshot = emu.clone();

    run_ok(&mut emu, Command::gate("X", &[("q", 1)]));
    run_ok(&mut emu, Command::create(&[("extra", 1)]));
    assert_eq!(snapshot.register_state("q")?.to_map(), BTreeMap::from([(0, one())]));
    assert!(snapshot.register_state("extra").is_err());
    assert_eq!(emu.register_state("q")?.to_map(), BTreeMap::from([(2, one())]));
    Ok(())
}

#[test]
fn test_json_restore_continues() -> Result<(), EmulatorError> {
    let mut emu = seeded(10);
    run_ok(&mut emu, Command::create(&[("a", 1)]));
    run_ok(&mut emu, Command::create(&[("b", 1)]));
    run_ok(&mut emu, Command::gate("H", &[("a", 0)]));
    run_ok(&mut emu, Command::gate("CNOT", &[("a", 0), ("b", 0)]));

    let mut restored = Emulation::from_json(&emu.to_json()?)?;
    assert_eq!(restored.real_name_of("a")?, emu.real_name_of("a")?);
    assert_eq!(restored.register_state("b")?, emu.register_state("b")?);

    // The restored copy keeps working and keeps generating fresh names.
    run_ok(&mut restored, Command::create(&[("c", 1)]));
    assert_ne!(restored.real_name_of("c")?, restored.real_name_of("a")?);
    let a = restored.measure("a", 0)?;
    assert_eq!(restored.measure("b", 0)?, a);

    assert!(matches!(Emulation::from_json("{not json"), Err(EmulatorError::Serialization(_))));
    Ok(())
}
