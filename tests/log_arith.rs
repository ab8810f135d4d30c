use assert_approx_eq::assert_approx_eq;
use octopus_core::log_arith::{log_sum_exp, log_sum_exp2, log_sum_exp3, ln_small, log_multinomial_coefficient};

#[test]
fn log_sum_exp_law_a_plus_neg_inf_is_a() {
    assert_eq!(log_sum_exp2(-2.3, f64::NEG_INFINITY), -2.3);
}

#[test]
fn log_sum_exp_law_doubling() {
    let a = -0.75;
    assert_approx_eq!(log_sum_exp2(a, a), a + 2.0_f64.ln(), 1e-12);
}

#[test]
fn log_sum_exp_is_symmetric() {
    assert_approx_eq!(log_sum_exp2(-0.2, -5.1), log_sum_exp2(-5.1, -0.2), 1e-15);
}

#[test]
fn three_ary_agrees_with_k_ary() {
    let values = [-0.4, -2.1, -1.0];
    assert_approx_eq!(
        log_sum_exp3(values[0], values[1], values[2]),
        log_sum_exp(&values),
        1e-12
    );
}

#[test]
fn ln_small_table_matches_platform_ln_through_ten() {
    for n in 1..=10u32 {
        assert_approx_eq!(ln_small(n), (n as f64).ln(), 1e-12);
    }
}

#[test]
fn ln_small_of_zero_is_positive_infinity() {
    assert_eq!(ln_small(0), f64::INFINITY);
}

#[test]
fn multinomial_coefficient_matches_binomial_identity() {
    // C(10, 3) = 120
    let expected = 120.0_f64.ln();
    assert_approx_eq!(log_multinomial_coefficient(&[3, 7]), expected, 1e-9);
}
