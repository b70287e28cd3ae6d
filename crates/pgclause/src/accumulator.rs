//! Result accumulation.
//!
//! An accumulator owns the receivers a query scans into and turns the
//! receivers' current state into one result per row.

use crate::receiver::Destination;

/// Caller-side sink for query results.
pub trait Accumulator {
    type Output;

    /// Column name to destination mapping, bound with
    /// [`Table::load_receivers_from_accumulator`](crate::Table::load_receivers_from_accumulator).
    fn column_receivers(&self) -> Vec<(String, Destination)>;

    /// Capture the current receiver state as one result.
    fn accumulate(&mut self);

    /// Results captured so far, in row order.
    fn results(&self) -> &[Self::Output];
}

impl<A: Accumulator + ?Sized> Accumulator for &mut A {
    type Output = A::Output;

    fn column_receivers(&self) -> Vec<(String, Destination)> {
        (**self).column_receivers()
    }

    fn accumulate(&mut self) {
        (**self).accumulate()
    }

    fn results(&self) -> &[Self::Output] {
        (**self).results()
    }
}

/// Generic accumulator: a receiver map plus a snapshot closure.
///
/// # Example
///
/// ```rust
/// use pgclause::{Accumulator, Destination, NullInt64, ResultAccumulator, Slot};
///
/// let name = Slot::new(String::new());
/// let stars = NullInt64::new(Slot::new(0));
///
/// let mut acc = ResultAccumulator::new(
///     [
///         ("cool", Destination::from(&name)),
///         ("number_of_star", stars.clone().into()),
///     ],
///     {
///         let name = name.clone();
///         move || (name.get(), stars.is_valid())
///     },
/// );
///
/// name.set("Dovahkiin".to_string());
/// acc.accumulate();
/// assert_eq!(acc.results(), &[("Dovahkiin".to_string(), false)]);
/// ```
pub struct ResultAccumulator<T, F> {
    receivers: Vec<(String, Destination)>,
    snapshot: F,
    results: Vec<T>,
}

impl<T, F> ResultAccumulator<T, F>
where
    F: FnMut() -> T,
{
    pub fn new<I, K, D>(receivers: I, snapshot: F) -> Self
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<Destination>,
    {
        Self {
            receivers: receivers
                .into_iter()
                .map(|(k, d)| (k.into(), d.into()))
                .collect(),
            snapshot,
            results: Vec::new(),
        }
    }

    pub fn into_results(self) -> Vec<T> {
        self.results
    }
}

impl<T, F> Accumulator for ResultAccumulator<T, F>
where
    F: FnMut() -> T,
{
    type Output = T;

    fn column_receivers(&self) -> Vec<(String, Destination)> {
        self.receivers.clone()
    }

    fn accumulate(&mut self) {
        let result = (self.snapshot)();
        self.results.push(result);
    }

    fn results(&self) -> &[T] {
        &self.results
    }
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for ResultAccumulator<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultAccumulator")
            .field("receivers", &self.receivers)
            .field("results", &self.results)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nullable::{NullBool, NullInt64};
    use crate::receiver::{Receiver, Slot};
    use crate::value::Value;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: String,
        stars: i64,
        is_true: bool,
    }

    #[test]
    fn accumulates_snapshots_of_receivers() {
        let name = Slot::new(String::new());
        let stars = Slot::new(0i64);
        let is_true = Slot::new(false);

        let mut acc = ResultAccumulator::new(
            [
                ("cool", Destination::from(&name)),
                ("number_of_star", NullInt64::new(stars.clone()).into()),
                ("is_true_true", NullBool::new(is_true.clone()).into()),
            ],
            {
                let (name, stars, is_true) = (name.clone(), stars.clone(), is_true.clone());
                move || Row {
                    name: name.get(),
                    stars: stars.get(),
                    is_true: is_true.get(),
                }
            },
        );

        let receivers = acc.column_receivers();
        let write = |column: &str, value: Value| {
            let (_, dest) = receivers.iter().find(|(c, _)| c == column).unwrap();
            let Destination::Receiver(r) = dest else {
                panic!("{column} is not a receiver");
            };
            r.scan(Some(value)).unwrap();
        };

        write("cool", Value::from("doom"));
        write("number_of_star", Value::Int64(64));
        write("is_true_true", Value::Bool(true));
        acc.accumulate();

        name.set("second".to_string());
        acc.accumulate();

        assert_eq!(
            acc.results(),
            &[
                Row {
                    name: "doom".to_string(),
                    stars: 64,
                    is_true: true,
                },
                Row {
                    name: "second".to_string(),
                    stars: 64,
                    is_true: true,
                },
            ]
        );
    }

    #[test]
    fn mut_refs_accumulate_into_the_original() {
        let counter = Slot::new(0i32);
        let mut acc = ResultAccumulator::new([("n", Receiver::from(counter.clone()))], {
            let counter = counter.clone();
            move || counter.get()
        });

        fn accumulate_once<A: Accumulator>(mut acc: A) -> usize {
            acc.accumulate();
            acc.results().len()
        }

        counter.set(1);
        assert_eq!(accumulate_once(&mut acc), 1);

        counter.set(2);
        acc.accumulate();
        assert_eq!(acc.into_results(), vec![1, 2]);
    }
}
