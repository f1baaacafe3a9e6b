use super::RateLimiter;

#[test]
fn it_rejects_the_eleventh_request_in_a_window() {
    let limiter = RateLimiter::new(10, 600);

    for n in 0..10 {
        let decision = limiter.check_at("203.0.113.7", 1_000);
        assert!(decision.admitted);
        assert_eq!(decision.remaining, 10 - n - 1);
        assert_eq!(decision.limit, 10);
    }

    let decision = limiter.check_at("203.0.113.7", 1_000);
    assert!(!decision.admitted);
    assert_eq!(decision.remaining, 0);
    assert_eq!(decision.reset, 1_600);
}

#[test]
fn it_admits_again_after_the_window_elapses() {
    let limiter = RateLimiter::new(10, 600);

    for _ in 0..10 {
        assert!(limiter.check_at("203.0.113.7", 1_000).admitted);
    }
    assert!(!limiter.check_at("203.0.113.7", 1_599).admitted);

    let decision = limiter.check_at("203.0.113.7", 1_600);
    assert!(decision.admitted);
    assert_eq!(decision.remaining, 9);
    assert_eq!(decision.reset, 2_200);
}

#[test]
fn it_tracks_keys_independently() {
    let limiter = RateLimiter::new(1, 600);

    assert!(limiter.check_at("198.51.100.1", 1_000).admitted);
    assert!(!limiter.check_at("198.51.100.1", 1_001).admitted);
    assert!(limiter.check_at("198.51.100.2", 1_001).admitted);
}

#[test]
fn it_admits_nothing_with_a_zero_limit() {
    let limiter = RateLimiter::new(0, 600);

    let decision = limiter.check_at("203.0.113.7", 1_000);
    assert!(!decision.admitted);
    assert_eq!(decision.remaining, 0);
}

#[test]
fn it_uses_the_wall_clock_by_default() {
    let limiter = RateLimiter::new(2, 600);

    let first = limiter.check("203.0.113.9");
    let second = limiter.check("203.0.113.9");
    let third = limiter.check("203.0.113.9");

    assert!(first.admitted);
    assert!(second.admitted);
    assert!(!third.admitted);
    assert!(first.reset > 0);
}
