use super::constants::MIN_SPLINE_POINTS;
use super::error::IntegrationError;

/// Interpolating cubic spline with not-a-knot end conditions.
///
/// This is the same curve as a zero-smoothing cubic B-spline fit (FITPACK `splrep` with
/// `s=0`): the knots are the data points except the second and second-to-last, which is
/// equivalent to demanding a continuous third derivative at those two points.
///
/// The curve is stored as the data points plus the second derivative at each point.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    second_derivs: Vec<f64>,
}

impl CubicSpline {
    /// Fit the spline through `(x, y)`. `x` must be strictly increasing with at least four
    /// points.
    pub fn not_a_knot(x: &[f64], y: &[f64]) -> Result<Self, IntegrationError> {
        if x.len() != y.len() {
            return Err(IntegrationError::LengthMismatch(x.len(), y.len()));
        }
        if x.len() < MIN_SPLINE_POINTS {
            return Err(IntegrationError::TooFewSamples(x.len()));
        }
        if let Some(pair) = x.windows(2).find(|pair| pair[1] <= pair[0]) {
            return Err(IntegrationError::NonIncreasing(pair[1], pair[0]));
        }

        let n = x.len() - 1; // number of intervals
        let h: Vec<f64> = x.windows(2).map(|pair| pair[1] - pair[0]).collect();

        // Tridiagonal system for the interior second derivatives M_1..M_{n-1}, with the
        // not-a-knot conditions used to eliminate M_0 and M_n from the first and last rows.
        let k = n - 1;
        let mut sub = vec![0.0; k];
        let mut diag = vec![0.0; k];
        let mut sup = vec![0.0; k];
        let mut rhs = vec![0.0; k];
        for j in 0..k {
            let i = j + 1;
            sub[j] = h[i - 1];
            diag[j] = 2.0 * (h[i - 1] + h[i]);
            sup[j] = h[i];
            rhs[j] = 6.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
        }
        let (h0, h1) = (h[0], h[1]);
        diag[0] = (h0 + h1) * (h0 + 2.0 * h1) / h1;
        sup[0] = (h1 * h1 - h0 * h0) / h1;
        let (hl, hr) = (h[n - 2], h[n - 1]);
        sub[k - 1] = (hl * hl - hr * hr) / hl;
        diag[k - 1] = (hl + hr) * (2.0 * hl + hr) / hl;

        let interior = solve_tridiagonal(&sub, &diag, &sup, &rhs);

        let mut second_derivs = Vec::with_capacity(n + 1);
        second_derivs.push(((h0 + h1) * interior[0] - h0 * interior[1]) / h1);
        second_derivs.extend_from_slice(&interior);
        second_derivs.push(((hl + hr) * interior[k - 1] - hr * interior[k - 2]) / hl);

        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            second_derivs,
        })
    }

    /// Polynomial coefficients of interval i in powers of `t = x - x_i`
    fn coefficients(&self, i: usize) -> [f64; 4] {
        let h = self.x[i + 1] - self.x[i];
        let (m0, m1) = (self.second_derivs[i], self.second_derivs[i + 1]);
        [
            self.y[i],
            (self.y[i + 1] - self.y[i]) / h - h * (2.0 * m0 + m1) / 6.0,
            m0 / 2.0,
            (m1 - m0) / (6.0 * h),
        ]
    }

    fn interval(&self, x: f64) -> usize {
        let last = self.x.len() - 2;
        self.x.partition_point(|&xi| xi <= x).saturating_sub(1).min(last)
    }

    /// Value of the spline at x. Outside the data range the end polynomials are extended.
    pub fn evaluate(&self, x: f64) -> f64 {
        let i = self.interval(x);
        let t = x - self.x[i];
        let [a, b, c, d] = self.coefficients(i);
        a + t * (b + t * (c + t * d))
    }

    /// Definite integral from a to b, with both limits clamped to the data range
    pub fn integral(&self, a: f64, b: f64) -> f64 {
        if b < a {
            return -self.integral(b, a);
        }
        let first = self.x[0];
        let last = self.x[self.x.len() - 1];
        let (a, b) = (a.clamp(first, last), b.clamp(first, last));

        let mut total = 0.0;
        for i in 0..self.x.len() - 1 {
            let lo = a.max(self.x[i]);
            let hi = b.min(self.x[i + 1]);
            if hi <= lo {
                continue;
            }
            let coef = self.coefficients(i);
            total += antiderivative(&coef, hi - self.x[i]) - antiderivative(&coef, lo - self.x[i]);
        }
        total
    }
}

fn antiderivative(coef: &[f64; 4], t: f64) -> f64 {
    let [a, b, c, d] = *coef;
    t * (a + t * (b / 2.0 + t * (c / 3.0 + t * d / 4.0)))
}

/// Thomas algorithm. `sub[0]` and `sup[last]` are ignored.
fn solve_tridiagonal(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Vec<f64> {
    let n = diag.len();
    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];
    c_prime[0] = sup[0] / diag[0];
    d_prime[0] = rhs[0] / diag[0];
    for i in 1..n {
        let denom = diag[i] - sub[i] * c_prime[i - 1];
        c_prime[i] = if i < n - 1 { sup[i] / denom } else { 0.0 };
        d_prime[i] = (rhs[i] - sub[i] * d_prime[i - 1]) / denom;
    }
    let mut solution = vec![0.0; n];
    solution[n - 1] = d_prime[n - 1];
    for i in (0..n - 1).rev() {
        solution[i] = d_prime[i] - c_prime[i] * solution[i + 1];
    }
    solution
}
