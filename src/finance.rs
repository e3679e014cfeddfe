//! Interest-only building blocks: discounting, the Woolhouse correction for
//! payments made k times a year, and the annuity-certain

/// Payment frequencies for which the Woolhouse correction is defined
pub const SUPPORTED_FREQUENCIES: [u32; 4] = [1, 2, 4, 12];

/// Annual discount factor v = 1 / (1 + i)
///
/// Zero and negative rates are not compounded: v = 1.
pub fn discount_factor(rate: f64) -> f64 {
    if rate > 0.0 {
        1.0 / (1.0 + rate)
    } else {
        1.0
    }
}

/// First-order Woolhouse correction β(k, i) for k payments per year
///
/// β(k, i) = (1 + i) / k · Σ_{w=0}^{k-1} (w/k) / (1 + (w/k)·i)
///
/// Annual payments need no correction. Frequencies outside {1, 2, 4, 12}
/// are treated as annual and also yield 0.
pub fn fractional_payment_adjustment(k: u32, rate: f64) -> f64 {
    if k <= 1 || !SUPPORTED_FREQUENCIES.contains(&k) {
        return 0.0;
    }

    let kf = k as f64;
    let sum: f64 = (0..k)
        .map(|w| {
            let frac = w as f64 / kf;
            frac / (1.0 + frac * rate)
        })
        .sum();

    (1.0 + rate) / kf * sum
}

/// Present value of `g` certain annual payments in advance, paid k times a year
///
/// ä_g^(k) = (1 - v^g) / (1 - v) - β(k, i)·(1 - v^g)
///
/// Returns 0 for g = 0 or k = 0, and `g` when the rate is not positive.
pub fn annuity_certain(g: u32, rate: f64, k: u32) -> f64 {
    if g == 0 || k == 0 {
        return 0.0;
    }
    if rate <= 0.0 {
        return g as f64;
    }

    let v = discount_factor(rate);
    let vg = v.powi(g as i32);
    (1.0 - vg) / (1.0 - v) - fractional_payment_adjustment(k, rate) * (1.0 - vg)
}
