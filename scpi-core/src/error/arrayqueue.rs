use arrayvec::ArrayVec;

use crate::error::{Error, ErrorCode, ErrorQueue};

/// Default error queue based on an alloc-less array queue.
pub struct ArrayErrorQueue<const CAP: usize> {
    vec: ArrayVec<Error, CAP>,
}

impl<const CAP: usize> Default for ArrayErrorQueue<CAP> {
    fn default() -> Self {
        ArrayErrorQueue {
            vec: ArrayVec::new(),
        }
    }
}

impl<const CAP: usize> ArrayErrorQueue<CAP> {
    pub fn new() -> Self {
        ArrayErrorQueue::default()
    }
}

impl<const CAP: usize> ErrorQueue for ArrayErrorQueue<CAP> {
    fn push_back_error(&mut self, err: Error) {
        //Try to queue an error, replace newest with QueueOverflow if full
        if self.vec.try_push(err).is_err() {
            let _ = self.vec.pop().unwrap();
            self.vec.try_push(ErrorCode::QueueOverflow.into()).unwrap();
        }
    }

    fn pop_front_error(&mut self) -> Error {
        self.vec
            .pop_at(0)
            .unwrap_or_else(|| ErrorCode::NoError.into())
    }

    fn num_errors(&self) -> usize {
        self.vec.len()
    }

    fn clear_errors(&mut self) {
        self.vec.clear()
    }
}

#[cfg(test)]
mod test_error_queue {
    use super::*;

    #[test]
    fn test_queue_noerror() {
        // Queue returns NoError once drained
        let mut errors = ArrayErrorQueue::<10>::new();
        errors.push_back_error(ErrorCode::Custom(1, b"One").into());
        errors.push_back_error(ErrorCode::Custom(2, b"Two").into());
        assert_eq!(
            errors.pop_front_error(),
            Error::new(ErrorCode::Custom(1, b"One"))
        );
        assert_eq!(
            errors.pop_front_error(),
            Error::new(ErrorCode::Custom(2, b"Two"))
        );
        assert_eq!(errors.pop_front_error(), Error::new(ErrorCode::NoError));
    }

    #[test]
    fn test_queue_overflow() {
        // Newest error is replaced by QueueOverflow when full
        let mut errors = ArrayErrorQueue::<2>::new();
        errors.push_back_error(ErrorCode::Custom(1, b"One").into());
        errors.push_back_error(ErrorCode::Custom(2, b"Two").into());
        errors.push_back_error(ErrorCode::Custom(3, b"Three").into());
        assert_eq!(
            errors.pop_front_error(),
            Error::new(ErrorCode::Custom(1, b"One"))
        );
        assert_eq!(
            errors.pop_front_error(),
            Error::new(ErrorCode::QueueOverflow)
        );
    }
}
