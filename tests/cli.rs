use poolsim::SummaryRecord;
use std::process::Command;

fn poolsim(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_poolsim"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch poolsim")
}

#[test]
fn prints_exactly_one_summary_line() {
    let output = poolsim(&[
        "--pool-capacity",
        "10",
        "--sim-duration",
        "300",
        "--num-experiments",
        "3",
        "--log-level",
        "debug",
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(1, stdout.lines().count(), "diagnostics leaked to stdout: {stdout}");

    let record = SummaryRecord::find(&stdout).unwrap();
    assert_eq!("poolsim", record.framework);
    assert_eq!(10, record.pool_capacity);
    assert_eq!(300, record.sim_duration);
    assert_eq!(3, record.num_experiments);
    assert!(record.avg_served_customers <= record.avg_customers);
}

#[test]
fn output_is_reproducible_apart_from_timing() {
    let args = ["--pool-capacity", "5", "--sim-duration", "240", "--num-experiments", "2", "--seed", "7"];
    let decode = |output: std::process::Output| {
        let mut record = SummaryRecord::find(&String::from_utf8(output.stdout).unwrap()).unwrap();
        record.average_time = 0.0;
        record.min_time = 0.0;
        record.max_time = 0.0;
        record.total_time = 0.0;
        record
    };
    assert_eq!(decode(poolsim(&args)), decode(poolsim(&args)));
}

#[test]
fn invalid_arguments_fail_without_a_summary() {
    let output = poolsim(&["--pool-capacity", "0"]);
    assert!(!output.status.success());
    assert!(SummaryRecord::find(&String::from_utf8_lossy(&output.stdout)).is_err());
}
