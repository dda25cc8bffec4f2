/// Returns ceil(log2(x)), with `log2_ceil(0) == log2_ceil(1) == 0`.
#[inline]
pub fn log2_ceil(x: usize) -> usize {
    if x <= 1 {
        0
    } else {
        (usize::BITS - (x - 1).leading_zeros()) as usize
    }
}

/// Returns floor(sqrt(x)).
pub fn isqrt(x: usize) -> usize {
    if x < 2 {
        return x;
    }
    let mut r: usize = (x as f64).sqrt() as usize;
    while r * r > x {
        r -= 1;
    }
    while (r + 1) * (r + 1) <= x {
        r += 1;
    }
    r
}

#[cfg(test)]
mod tests {
    use super::{isqrt, log2_ceil};

    #[test]
    fn log2_ceil_small() {
        let want: [usize; 10] = [0, 0, 1, 2, 2, 3, 3, 3, 3, 4];
        want.iter()
            .enumerate()
            .for_each(|(x, w)| assert_eq!(log2_ceil(x), *w, "x={}", x));
    }

    #[test]
    fn isqrt_exact() {
        (0..2000usize).for_each(|x| {
            let r: usize = isqrt(x);
            assert!(r * r <= x && (r + 1) * (r + 1) > x, "x={} r={}", x, r);
        });
    }
}
