use std::process::Command;

fn run(input: &str) -> String {
    let out = Command::new(env!("CARGO_BIN_EXE_lanczos"))
        .arg(input)
        .env("NO_COLOR", "1")
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    String::from_utf8(out.stdout).unwrap()
}

#[test]
fn every_orbital_pair_is_written() {
    let out = run("tests/inputs/feas_dimer.inp");
    assert!(out.contains("Energy="));
    let gf: Vec<&str> = out.lines().filter(|l| l.starts_with("#gf(i=0,j=1)")).collect();
    assert_eq!(gf.len(), 3);
    for orbs in ["orbs=(0,0)", "orbs=(0,1)", "orbs=(1,1)"] {
        assert_eq!(gf.iter().filter(|l| l.ends_with(orbs)).count(), 1);
    }
    let nn: Vec<&str> = out.lines().filter(|l| l.starts_with("#n(")).collect();
    assert_eq!(nn.len(), 4);
    for orbs in ["orbs=(0,0)", "orbs=(0,1)", "orbs=(1,0)", "orbs=(1,1)"] {
        assert_eq!(nn.iter().filter(|l| l.ends_with(orbs)).count(), 1);
    }
    // Five frequencies after each of the three spectra.
    assert_eq!(out.lines().filter(|l| l.starts_with("#omega")).count(), 3);
}

#[test]
fn bad_input_fails() {
    let out = Command::new(env!("CARGO_BIN_EXE_lanczos"))
        .arg("tests/inputs/does_not_exist.inp")
        .env("NO_COLOR", "1")
        .output()
        .unwrap();
    assert!(!out.status.success());
}
