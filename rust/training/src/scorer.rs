//! Classification accuracy of a trained model.
//!
//! The harness frames its objective as a minimisation, so [`accuracy`]
//! returns the fraction of correct predictions negated: `-1.0` is perfect,
//! `0.0` is never right. Negate again before showing it to a human.

use foldwise_data::Dataset;

use crate::Model;

/// Index of the first strictly greatest output.
///
/// Ties keep the earliest index; NaN never wins.
#[must_use]
pub fn predicted_class(outputs: &[f64]) -> usize {
    let mut best = f64::MIN;
    let mut class = 0;
    for (j, &value) in outputs.iter().enumerate() {
        if value > best {
            best = value;
            class = j;
        }
    }
    class
}

/// Index of the class indicator (target equal to 1.0), or 0 if none.
///
/// With several 1.0 entries the last one is reported. Such rows break the
/// one-hot invariant and are not a supported input.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn true_class(targets: &[f64]) -> usize {
    targets.iter().rposition(|&t| t == 1.0).unwrap_or(0)
}

fn check_arity<M: Model + ?Sized>(model: &M, data: &Dataset) -> Result<(), ScoreError> {
    if model.num_inputs() != data.num_inputs() {
        return Err(ScoreError::InputArity {
            model: model.num_inputs(),
            data: data.num_inputs(),
        });
    }
    if model.num_outputs() != data.num_outputs() {
        return Err(ScoreError::OutputArity {
            model: model.num_outputs(),
            data: data.num_outputs(),
        });
    }
    if data.is_empty() {
        return Err(ScoreError::Empty);
    }
    Ok(())
}

/// Negated fraction of samples whose predicted class equals the true class.
pub fn accuracy<M: Model + ?Sized>(model: &M, data: &Dataset) -> Result<f64, ScoreError> {
    check_arity(model, data)?;

    let mut output = vec![0.0; model.num_outputs()];
    let mut correct = 0usize;
    for i in 0..data.len() {
        model.forward(data.input(i), &mut output);
        if predicted_class(&output) == true_class(data.output(i)) {
            correct += 1;
        }
    }

    Ok(-(correct as f64) / data.len() as f64)
}

/// Mean squared residual over every sample and output.
pub fn mean_squared_error<M: Model + ?Sized>(model: &M, data: &Dataset) -> Result<f64, ScoreError> {
    check_arity(model, data)?;

    let mut output = vec![0.0; model.num_outputs()];
    let mut total = 0.0;
    for i in 0..data.len() {
        model.forward(data.input(i), &mut output);
        total += output
            .iter()
            .zip(data.output(i))
            .map(|(y, t)| (y - t) * (y - t))
            .sum::<f64>();
    }

    Ok(total / (data.len() * data.num_outputs()) as f64)
}

/// Scoring failures. All of them are configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoreError {
    #[error("model has {model} inputs but the dataset has {data}")]
    InputArity { model: usize, data: usize },
    #[error("model has {model} outputs but the dataset has {data}")]
    OutputArity { model: usize, data: usize },
    #[error("cannot score an empty dataset")]
    Empty,
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    /// Replays a fixed output row per sample, keyed by input 0.
    struct Lookup {
        rows: Vec<Vec<f64>>,
    }

    impl Model for Lookup {
        fn num_inputs(&self) -> usize {
            1
        }
        fn num_outputs(&self) -> usize {
            self.rows[0].len()
        }
        fn forward(&self, input: &[f64], output: &mut [f64]) {
            output.copy_from_slice(&self.rows[input[0] as usize]);
        }
    }

    fn data(targets: &[Vec<f64>]) -> Dataset {
        let inputs: Vec<Vec<f64>> = (0..targets.len()).map(|i| vec![i as f64]).collect();
        Dataset::from_rows(&inputs, targets).unwrap()
    }

    #[test]
    fn perfect_model_scores_minus_one() {
        let targets = vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]];
        let model = Lookup {
            rows: vec![vec![0.9, 0.1], vec![0.7, 0.2], vec![0.3, 0.8]],
        };
        assert_eq!(accuracy(&model, &data(&targets)).unwrap(), -1.0);
    }

    #[test]
    fn exact_outputs_score_minus_one() {
        let targets = vec![vec![0.0, 0.0, 1.0], vec![0.0, 1.0, 0.0], vec![1.0, 0.0, 0.0]];
        let model = Lookup {
            rows: targets.clone(),
        };
        assert_eq!(accuracy(&model, &data(&targets)).unwrap(), -1.0);
    }

    #[test]
    fn partial_accuracy_is_negated_fraction() {
        let targets = vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
        ];
        let model = Lookup {
            rows: vec![vec![0.9, 0.1], vec![0.9, 0.1], vec![0.1, 0.9], vec![0.1, 0.9]],
        };
        assert_eq!(accuracy(&model, &data(&targets)).unwrap(), -0.5);
    }

    #[test_case(&[0.2, 0.5, 0.5], 1 ; "tie_keeps_first")]
    #[test_case(&[0.3, 0.1, 0.2], 0 ; "max_first")]
    #[test_case(&[f64::NAN, 0.1], 1 ; "nan_never_wins")]
    #[test_case(&[f64::NEG_INFINITY, f64::NEG_INFINITY], 0 ; "all_negative_infinity")]
    fn predicted_class_tie_break(outputs: &[f64], expected: usize) {
        assert_eq!(predicted_class(outputs), expected);
    }

    #[test_case(&[0.0, 1.0, 0.0], 1 ; "one_hot")]
    #[test_case(&[1.0, 0.0, 1.0], 2 ; "duplicate_indicator_last_wins")]
    #[test_case(&[0.0, 0.0], 0 ; "no_indicator")]
    fn true_class_reads_indicator(targets: &[f64], expected: usize) {
        assert_eq!(true_class(targets), expected);
    }

    #[test]
    fn arity_mismatch_is_rejected() {
        let targets = vec![vec![1.0, 0.0, 0.0]];
        let model = Lookup {
            rows: vec![vec![1.0, 0.0]],
        };
        assert_eq!(
            accuracy(&model, &data(&targets)),
            Err(ScoreError::OutputArity { model: 2, data: 3 })
        );

        let wide = Dataset::from_rows(&[vec![0.0, 0.0]], &[vec![1.0, 0.0]]).unwrap();
        assert_eq!(
            accuracy(&model, &wide),
            Err(ScoreError::InputArity { model: 1, data: 2 })
        );
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let model = Lookup {
            rows: vec![vec![1.0, 0.0]],
        };
        assert_eq!(
            accuracy(&model, &Dataset::empty(1, 2)),
            Err(ScoreError::Empty)
        );
    }

    #[test]
    fn mse_averages_over_outputs() {
        let targets = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let model = Lookup {
            rows: vec![vec![0.5, 0.5], vec![0.0, 1.0]],
        };
        // (0.25 + 0.25 + 0 + 0) / 4
        let mse = mean_squared_error(&model, &data(&targets)).unwrap();
        assert!((mse - 0.125).abs() < 1e-12);
    }
}
