pub trait ComputeBackend: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Runs `kernel` once for every lane.
    ///
    /// # Arguments
    /// * `lanes`: Per-lane working data. Each lane is handed to exactly one
    ///            kernel invocation and may be mutated freely.
    /// * `kernel`: Called as `kernel(index, lane)`. It must not depend on the
    ///             order in which lanes are visited; backends are free to run
    ///             lanes concurrently.
    fn map_lanes<T, K>(&self, lanes: &mut [T], kernel: K)
    where
        T: Send,
        K: Fn(usize, &mut T) + Send + Sync;
}
