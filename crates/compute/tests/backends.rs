// Golden-master checks: every compiled-in backend must agree with the
// sequential CPU backend lane for lane.

use compute::{default_backend, Backend, ComputeBackend, ExecutionTarget};

#[derive(Clone, Debug, PartialEq)]
struct Lane {
    value: f64,
    steps: u32,
}

fn run_kernel(backend: &Backend, lanes: &mut [Lane]) {
    backend.map_lanes(lanes, |i, lane| {
        for _ in 0..=(i % 7) {
            lane.value = lane.value.mul_add(0.5, 1.0).cos();
            lane.steps += 1;
        }
    });
}

#[test]
fn default_backend_matches_cpu() {
    let input: Vec<Lane> = (0..2048)
        .map(|i| Lane { value: f64::from(i) * 0.01, steps: 0 })
        .collect();

    let cpu = Backend::for_target(ExecutionTarget::Cpu).unwrap();
    let mut expected = input.clone();
    run_kernel(&cpu, &mut expected);

    let backend = default_backend();
    let mut actual = input;
    run_kernel(&backend, &mut actual);

    assert_eq!(expected.len(), actual.len(), "Mismatched number of lanes");
    for (i, (e, a)) in expected.iter().zip(&actual).enumerate() {
        assert_eq!(e.steps, a.steps, "Mismatch in step count at lane {i}");
        assert_eq!(e.value.to_bits(), a.value.to_bits(), "Mismatch in value at lane {i}");
    }
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_target_selects_parallel_backend() {
    let backend = Backend::for_target(ExecutionTarget::Parallel).unwrap();
    assert_eq!(backend.target(), ExecutionTarget::Parallel);
    assert_eq!(backend.name(), "parallel");
}
