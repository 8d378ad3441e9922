use std::sync::Mutex;

/// A bounded stack of evaluators shared between worker partitions.
///
/// `get` pops and `release` pushes; a worker holds one evaluator for the
/// whole of its partition, so contention on the lock is negligible. The
/// pool is primed with one evaluator per worker and never grows past its
/// capacity.
#[derive(Debug)]
pub struct EvaluatorPool<E> {
    evaluators: Mutex<Vec<E>>,
    capacity: usize,
}

impl<E> EvaluatorPool<E> {
    /// Builds a pool of `capacity` evaluators produced by `create`.
    pub fn new(capacity: usize, mut create: impl FnMut() -> E) -> EvaluatorPool<E> {
        EvaluatorPool {
            evaluators: Mutex::new((0..capacity).map(|_| create()).collect()),
            capacity,
        }
    }

    /// Pops an evaluator. Panics if the pool is exhausted, which would mean
    /// more concurrent partitions than the pool was sized for; that is a
    /// scheduler bug, not a recoverable condition.
    pub fn get(&self) -> E {
        self.evaluators
            .lock()
            .unwrap()
            .pop()
            .expect("evaluator pool exhausted: more partitions than workers")
    }

    /// Pushes an evaluator back.
    pub fn release(&self, evaluator: E) {
        let mut evaluators = self.evaluators.lock().unwrap();
        debug_assert!(evaluators.len() < self.capacity);
        evaluators.push(evaluator);
    }
}
