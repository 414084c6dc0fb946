//! Fixtures shared by unit tests.

use crate::Dataset;

/// `per_class[c]` samples of class `c`, interleaved by class. Input 0 holds
/// the sample's original index so tests can track where it ends up.
pub fn labelled(per_class: &[usize]) -> Dataset {
    let classes = per_class.len();
    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    let mut remaining = per_class.to_vec();
    let mut idx = 0.0;
    while remaining.iter().any(|&r| r > 0) {
        for (class, left) in remaining.iter_mut().enumerate() {
            if *left == 0 {
                continue;
            }
            *left -= 1;
            inputs.push(vec![idx, class as f64]);
            let mut y = vec![0.0; classes];
            y[class] = 1.0;
            outputs.push(y);
            idx += 1.0;
        }
    }
    Dataset::from_rows(&inputs, &outputs).unwrap()
}

/// Original indices (input 0) of every sample, in order.
pub fn ids(data: &Dataset) -> Vec<usize> {
    (0..data.len()).map(|i| data.input(i)[0] as usize).collect()
}
