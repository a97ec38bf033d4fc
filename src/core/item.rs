use std::fmt::Display;

use crate::error::CsvError;

/// Result of pulling one item: `Ok(None)` once the source is exhausted.
pub type ItemReaderResult<I> = Result<Option<I>, CsvError>;

pub type ItemProcessorResult<O> = Result<O, CsvError>;

pub type ItemWriterResult = Result<(), CsvError>;

/// A source of items pulled one at a time.
pub trait ItemReader<I> {
    fn read(&self) -> ItemReaderResult<I>;
}

/// A per-item transform applied between reading and yielding (or writing).
///
/// Any `Fn(I) -> O` closure is a processor, so most callers never implement
/// this trait by hand:
///
/// ```
/// use csv_stream_rs::core::item::ItemProcessor;
///
/// let double = |n: u32| n * 2;
/// assert_eq!(double.process(21).unwrap(), 42);
/// ```
pub trait ItemProcessor<I, O> {
    fn process(&self, item: I) -> ItemProcessorResult<O>;
}

impl<I, O, F> ItemProcessor<I, O> for F
where
    F: Fn(I) -> O,
{
    fn process(&self, item: I) -> ItemProcessorResult<O> {
        Ok(self(item))
    }
}

/// Adapts a fallible closure into a processor.
///
/// An `Err` returned by the closure becomes [`CsvError::Processor`] carrying
/// its message.
///
/// ```
/// use csv_stream_rs::core::item::{ItemProcessor, TryProcessor};
///
/// let parse = TryProcessor(|s: &str| s.parse::<u32>());
/// assert_eq!(parse.process("42").unwrap(), 42);
/// assert!(parse.process("forty-two").is_err());
/// ```
pub struct TryProcessor<F>(pub F);

impl<I, O, E, F> ItemProcessor<I, O> for TryProcessor<F>
where
    F: Fn(I) -> Result<O, E>,
    E: Display,
{
    fn process(&self, item: I) -> ItemProcessorResult<O> {
        (self.0)(item).map_err(|error| CsvError::Processor(error.to_string()))
    }
}

/// A sink accepting items in slices.
pub trait ItemWriter<W> {
    fn write(&self, items: &[W]) -> ItemWriterResult;
    fn flush(&self) -> ItemWriterResult;
    /// Called once before the first write.
    fn open(&self) -> ItemWriterResult {
        Ok(())
    }
}

/// Returns every item unchanged.
#[derive(Default)]
pub struct PassThroughProcessor;

impl<I> ItemProcessor<I, I> for PassThroughProcessor {
    fn process(&self, item: I) -> ItemProcessorResult<I> {
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::{ItemProcessor, PassThroughProcessor, TryProcessor};
    use crate::error::CsvError;

    #[test]
    fn closures_are_processors() {
        let upper = |s: String| s.to_uppercase();
        assert_eq!(upper.process("foo".to_string()).unwrap(), "FOO");
    }

    #[test]
    fn pass_through_returns_item_unchanged() {
        let processor = PassThroughProcessor;
        let item = vec!["a".to_string(), "b".to_string()];
        assert_eq!(processor.process(item.clone()).unwrap(), item);
    }

    #[test]
    fn rejected_items_become_processor_errors() {
        let positive = TryProcessor(|n: i32| {
            if n > 0 {
                Ok(n)
            } else {
                Err(format!("{} is not positive", n))
            }
        });

        assert_eq!(positive.process(3).unwrap(), 3);
        match positive.process(-1) {
            Err(CsvError::Processor(message)) => assert_eq!(message, "-1 is not positive"),
            other => panic!("expected a processor error, got {:?}", other),
        }
    }
}
