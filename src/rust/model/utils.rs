use ndarray::ArrayViewMut1;

pub(crate) fn l2_normalize(mut row: ArrayViewMut1<f32>) {
    let norm: f32 = row.iter().map(|&x| x * x).sum::<f32>().sqrt();
    if norm > 1e-10 {
        row /= norm;
    } else {
        row.fill(0.0);
    }
}

pub(crate) fn l1_normalize(mut row: ArrayViewMut1<f32>) {
    let norm: f32 = row.iter().map(|x| x.abs()).sum();
    if norm > 1e-10 {
        row /= norm;
    } else {
        row.fill(0.0);
    }
}

/// Index of the first maximal value, `None` for an empty slice.
pub(crate) fn argmax(scores: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &score) in scores.iter().enumerate() {
        match best {
            None => best = Some((i, score)),
            Some((_, best_score)) if score > best_score => best = Some((i, score)),
            _ => {}
        }
    }
    best.map(|(i, _)| i)
}
