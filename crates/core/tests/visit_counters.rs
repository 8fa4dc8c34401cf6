use visit_ledger_core::domain::visit_state::{RegisterOutcome, VisitCounters};

#[test]
fn monthly_counter_cycles_through_reward() {
    let mut c = VisitCounters::first();
    let mut seen = vec![c.monthly];
    for _ in 0..11 {
        c = c.advance(10);
        seen.push(c.monthly);
    }
    assert_eq!(seen, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 0, 1, 2]);
    assert_eq!(c.lifetime, 12);
}

#[test]
fn shorter_cycle_wraps_earlier() {
    let c = VisitCounters::first().advance(3).advance(3);
    assert_eq!(c.monthly, 0);
    assert_eq!(c.lifetime, 3);
}

#[test]
fn first_visit_is_never_a_reward() {
    let outcome = RegisterOutcome::FirstVisit {
        counters: VisitCounters::first(),
    };
    assert!(!outcome.is_reward());
    assert_eq!(outcome.message(10), "First visit registered.");
    assert_eq!(outcome.counters(), VisitCounters::first());
}
