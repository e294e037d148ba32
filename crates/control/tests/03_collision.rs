use control::{CollisionEvaluator, Obstacle};

fn evaluator() -> CollisionEvaluator {
    CollisionEvaluator::new(5.0, vec![Obstacle::new([-2.0, -2.0], 0.5)], 1.0)
}

#[test]
fn border_is_strict() {
    let ev = evaluator();
    assert!(ev.is_admissible(4.999, -4.999));
    assert!(!ev.is_admissible(5.0, 0.0));
    assert!(!ev.is_admissible(0.0, -5.0));
    assert!(!ev.is_admissible(7.0, 7.0));
}

#[test]
fn obstacle_boundary_is_blocked() {
    let ev = evaluator();
    assert!(!ev.is_admissible(-2.0, -2.0));
    assert!(!ev.is_admissible(-1.5, -2.5));
    assert!(ev.is_admissible(-1.49, -2.0));
    assert!(ev.is_admissible(-2.0, -2.51));
}

#[test]
fn penalty_is_charged_only_on_the_transition() {
    let ev = evaluator();
    let positions = [[0.0, 0.0], [-2.0, -2.0], [-2.0, -2.0], [0.0, 0.0]];
    let active = [true, true, false, false];
    let (flags, penalty) = ev.evaluate(&positions, &active);
    assert_eq!(flags, vec![true, false, false, false]);
    assert_eq!(penalty, vec![0.0, 1.0, 0.0, 0.0]);
}

#[test]
fn absorbed_samples_never_recover() {
    let ev = evaluator();
    let mut flag = true;
    let mut charged = 0.0;
    // Into the obstacle, then back out into free space.
    for p in [[-1.0, -1.0], [-2.0, -2.0], [-1.0, -1.0], [0.0, 0.0]] {
        let (next, penalty) = ev.transition(p, flag);
        assert!(!(next && !flag), "flag must be non-increasing");
        flag = next;
        charged += penalty;
    }
    assert!(!flag);
    assert_eq!(charged, 1.0);
}

#[test]
fn many_obstacles_are_all_checked() {
    let ev = CollisionEvaluator::new(
        5.0,
        vec![Obstacle::new([1.0, 1.0], 0.5), Obstacle::new([3.0, -3.0], 0.5)],
        2.0,
    );
    let (flags, penalty) = ev.evaluate(&[[3.2, -2.8], [1.0, -1.0]], &[true, true]);
    assert_eq!(flags, vec![false, true]);
    assert_eq!(penalty, vec![2.0, 0.0]);
}
