/// True when the half-open spans `[a, a + a_len)` and `[b, b + b_len)` share any point.
pub fn spans_overlap(a: f64, a_len: f64, b: f64, b_len: f64) -> bool {
    a < b + b_len && b < a + a_len
}
