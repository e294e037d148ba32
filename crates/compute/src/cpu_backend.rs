use crate::ComputeBackend;

#[derive(Default, Debug, Clone)]
pub struct CpuBackend;

impl CpuBackend {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn map_lanes<T, K>(&self, lanes: &mut [T], kernel: K)
    where
        T: Send,
        K: Fn(usize, &mut T) + Send + Sync,
    {
        for (index, lane) in lanes.iter_mut().enumerate() {
            kernel(index, lane);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visits_every_lane_once_in_order() {
        let cpu = CpuBackend::new();
        let mut lanes = vec![0usize; 5];
        cpu.map_lanes(&mut lanes, |i, lane| *lane += i + 1);
        assert_eq!(lanes, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn empty_lanes_is_a_no_op() {
        let cpu = CpuBackend::new();
        let mut lanes: Vec<f64> = Vec::new();
        cpu.map_lanes(&mut lanes, |_, _| unreachable!("no lanes to visit"));
        assert!(lanes.is_empty());
    }
}
