//! Apply per-column transforms to a row (or chunk of rows) of attributes.
//!
//! `ABSENT` (SQL NULL, `None`) attributes pass straight through untouched;
//! every other attribute is handed to its corresponding processor. A
//! processor failure is handed to a caller-supplied `generalize` callback
//! so the caller can fold column-specific context (which attribute, which
//! processor) into a single domain error before it propagates.

use crate::error::{Error, Result};
use crate::tuple::Attribute;
use bytes::Bytes;

/// A single column transform: takes the raw attribute bytes, produces
/// replacement bytes or fails.
pub type Processor = Box<dyn Fn(Bytes) -> Result<Bytes>>;

/// A callback that turns a processor's failure, plus the context it failed
/// in (the processors, the row, and the index that failed), into the
/// error that should actually propagate.
pub type Generalizer<'a> = dyn Fn(Error, &[Processor], &[Attribute], usize) -> Error + 'a;

/// Apply `processors[i]` to `inputs[i]` for every `i`, passing `None`
/// attributes through unchanged.
///
/// Fails with [`Error::ArityMismatch`] if the slices differ in length
/// without consulting `generalize`, since that failure has nothing to do
/// with any one attribute.
pub fn process_tuple(
    processors: &[Processor],
    inputs: Vec<Attribute>,
    generalize: &Generalizer<'_>,
) -> Result<Vec<Attribute>> {
    if processors.len() != inputs.len() {
        return Err(Error::ArityMismatch {
            processors: processors.len(),
            inputs: inputs.len(),
        });
    }

    let mut output = Vec::with_capacity(inputs.len());

    for (index, (processor, input)) in processors.iter().zip(inputs.iter()).enumerate() {
        match input {
            None => output.push(None),
            Some(value) => match processor(value.clone()) {
                Ok(transformed) => output.push(Some(transformed)),
                Err(err) => return Err(generalize(err, processors, &inputs, index)),
            },
        }
    }

    Ok(output)
}

/// Apply [`process_tuple`] to every row of an already-owned chunk,
/// replacing each row in place as it's processed.
///
/// Stops and returns the generalized error at the first row that fails;
/// rows already processed are not rolled back, matching a caller who
/// intends to discard the whole chunk on failure anyway.
pub fn process_chunk_in_place(
    processors: &[Processor],
    rows: &mut Vec<Vec<Attribute>>,
    generalize: &Generalizer<'_>,
) -> Result<()> {
    for row in rows.iter_mut() {
        let current = std::mem::take(row);
        *row = process_tuple(processors, current, generalize)?;
    }

    Ok(())
}

/// Apply [`process_tuple`] to every row yielded by `chunk`, collecting the
/// results into a new `Vec`.
///
/// Use this when the chunk isn't already an owned `Vec` (e.g. it's being
/// streamed out of [`crate::tuple::consume_tuple_messages`]); it collects
/// once up front rather than requiring the caller to do so.
pub fn process_chunk<I>(
    processors: &[Processor],
    chunk: I,
    generalize: &Generalizer<'_>,
) -> Result<Vec<Vec<Attribute>>>
where
    I: IntoIterator<Item = Vec<Attribute>>,
{
    let mut rows: Vec<Vec<Attribute>> = chunk.into_iter().collect();
    process_chunk_in_place(processors, &mut rows, generalize)?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use matches::assert_matches;

    fn upper() -> Processor {
        Box::new(|value: Bytes| Ok(Bytes::from(value.to_ascii_uppercase())))
    }

    fn always_fails() -> Processor {
        Box::new(|_| Err(Error::TypeMismatch("boom")))
    }

    fn passthrough(err: Error, _: &[Processor], _: &[Attribute], _: usize) -> Error {
        err
    }

    #[test]
    fn null_attributes_pass_through_untouched() {
        let processors = vec![upper()];
        let row: Vec<Attribute> = vec![None];

        let result = process_tuple(&processors, row, &passthrough).unwrap();
        assert_eq!(result, vec![None]);
    }

    #[test]
    fn non_null_attributes_are_transformed() {
        let processors = vec![upper(), upper()];
        let row: Vec<Attribute> = vec![Some(Bytes::from_static(b"ab")), None];

        let result = process_tuple(&processors, row, &passthrough).unwrap();
        assert_eq!(
            result,
            vec![Some(Bytes::from_static(b"AB")), None]
        );
    }

    #[test]
    fn arity_mismatch_is_rejected_up_front() {
        let processors = vec![upper()];
        let row: Vec<Attribute> = vec![None, None];

        assert_matches!(
            process_tuple(&processors, row, &passthrough),
            Err(Error::ArityMismatch {
                processors: 1,
                inputs: 2
            })
        );
    }

    #[test]
    fn processor_failure_is_routed_through_generalize() {
        let processors = vec![always_fails()];
        let row: Vec<Attribute> = vec![Some(Bytes::from_static(b"x"))];

        let generalize: &Generalizer<'_> =
            &|_err, _procs, _inputs, index| Error::TruncatedHeader { available: index };

        let result = process_tuple(&processors, row, generalize);
        assert_matches!(result, Err(Error::TruncatedHeader { available: 0 }));
    }

    #[test]
    fn process_chunk_transforms_every_row() {
        let processors = vec![upper()];
        let chunk = vec![
            vec![Some(Bytes::from_static(b"a"))],
            vec![None],
            vec![Some(Bytes::from_static(b"z"))],
        ];

        let result = process_chunk(&processors, chunk, &passthrough).unwrap();
        assert_eq!(result[0], vec![Some(Bytes::from_static(b"A"))]);
        assert_eq!(result[1], vec![None]);
        assert_eq!(result[2], vec![Some(Bytes::from_static(b"Z"))]);
    }

    #[test]
    fn process_chunk_stops_at_first_failing_row() {
        let processors = vec![always_fails()];
        let chunk = vec![
            vec![Some(Bytes::from_static(b"a"))],
            vec![Some(Bytes::from_static(b"b"))],
        ];

        let result = process_chunk(&processors, chunk, &passthrough);
        assert_matches!(result, Err(Error::TypeMismatch("boom")));
    }

    #[test]
    fn process_chunk_in_place_mutates_existing_vec() {
        let processors = vec![upper()];
        let mut rows = vec![vec![Some(Bytes::from_static(b"a"))]];

        process_chunk_in_place(&processors, &mut rows, &passthrough).unwrap();
        assert_eq!(rows[0], vec![Some(Bytes::from_static(b"A"))]);
    }
}
