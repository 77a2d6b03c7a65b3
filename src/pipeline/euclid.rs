// Euclidean rhythms via Bjorklund's algorithm.
//
// The onsets are spread as evenly as possible over the cycle, the pattern is
// turned so its first onset lands on step 0, and then the caller's rotation
// is applied as a left shift.

/// Build a `steps`-long onset pattern holding `clamp(pulses, 0, steps)` onsets,
/// rotated left by `rotation mod steps`. Negative rotations wrap around.
pub fn generate(pulses: i32, steps: usize, rotation: i64) -> Vec<bool> {
    if steps == 0 {
        return Vec::new();
    }
    let onsets = (pulses.max(0) as usize).min(steps);

    let mut pattern = if onsets == 0 {
        vec![false; steps]
    } else if onsets == steps {
        vec![true; steps]
    } else {
        bjorklund(onsets, steps)
    };

    let shift = rotation.rem_euclid(steps as i64) as usize;
    pattern.rotate_left(shift);
    pattern
}

// 0 < pulses < steps
fn bjorklund(pulses: usize, steps: usize) -> Vec<bool> {
    let mut counts: Vec<usize> = Vec::new();
    let mut remainders: Vec<usize> = vec![pulses];
    let mut divisor = steps - pulses;
    let mut level = 0;

    while remainders[level] > 1 {
        counts.push(divisor / remainders[level]);
        remainders.push(divisor % remainders[level]);
        divisor = remainders[level];
        level += 1;
    }
    counts.push(divisor);

    let mut pattern = Vec::with_capacity(steps);
    build(level as isize, &counts, &remainders, &mut pattern);

    // downbeat first
    if let Some(first) = pattern.iter().position(|&onset| onset) {
        pattern.rotate_left(first);
    }
    pattern
}

fn build(level: isize, counts: &[usize], remainders: &[usize], out: &mut Vec<bool>) {
    match level {
        -1 => out.push(false),
        -2 => out.push(true),
        _ => {
            let l = level as usize;
            for _ in 0..counts[l] {
                build(level - 1, counts, remainders, out);
            }
            if remainders[l] != 0 {
                build(level - 2, counts, remainders, out);
            }
        }
    }
}
