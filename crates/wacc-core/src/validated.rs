//! Error-accumulating results.
//!
//! A `Parsed<T>` is either a value or every error found while producing it.
//! Combining several `Parsed` values keeps the errors of *all* failing
//! inputs, so one bad sub-expression never hides a second one next to it.

use crate::CompilationError;

/// A value, or all the errors that prevented building it.
pub type Parsed<T> = Result<T, Vec<CompilationError>>;

/// A failed `Parsed` holding one error.
pub fn fail<T>(error: CompilationError) -> Parsed<T> {
    Err(vec![error])
}

/// Combine two results, concatenating errors from both sides.
pub fn zip<A, B>(a: Parsed<A>, b: Parsed<B>) -> Parsed<(A, B)> {
    match (a, b) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(mut ea), Err(eb)) => {
            ea.extend(eb);
            Err(ea)
        }
        (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
    }
}

pub fn zip3<A, B, C>(a: Parsed<A>, b: Parsed<B>, c: Parsed<C>) -> Parsed<(A, B, C)> {
    zip(zip(a, b), c).map(|((a, b), c)| (a, b, c))
}

pub fn zip4<A, B, C, D>(
    a: Parsed<A>,
    b: Parsed<B>,
    c: Parsed<C>,
    d: Parsed<D>,
) -> Parsed<(A, B, C, D)> {
    zip(zip3(a, b, c), d).map(|((a, b, c), d)| (a, b, c, d))
}

/// Collect a sequence of results, keeping every error in order.
pub fn collect_all<T>(items: impl IntoIterator<Item = Parsed<T>>) -> Parsed<Vec<T>> {
    let mut values = Vec::new();
    let mut errors = Vec::new();
    for item in items {
        match item {
            Ok(value) => values.push(value),
            Err(e) => errors.extend(e),
        }
    }
    if errors.is_empty() {
        Ok(values)
    } else {
        Err(errors)
    }
}

/// Chaining helpers on `Parsed`.
pub trait ParsedExt<T> {
    /// Run a further check on a successful value.
    fn validate(self, check: impl FnOnce(&T) -> Option<CompilationError>) -> Parsed<T>;

    /// Add errors found independently of this value, failing if there are any.
    fn also(self, errors: Vec<CompilationError>) -> Parsed<T>;

    /// Errors of a failed result, or none.
    fn errors(&self) -> &[CompilationError];
}

impl<T> ParsedExt<T> for Parsed<T> {
    fn validate(self, check: impl FnOnce(&T) -> Option<CompilationError>) -> Parsed<T> {
        let value = self?;
        match check(&value) {
            Some(error) => fail(error),
            None => Ok(value),
        }
    }

    fn also(self, extra: Vec<CompilationError>) -> Parsed<T> {
        match self {
            Ok(value) if extra.is_empty() => Ok(value),
            Ok(_) => Err(extra),
            Err(mut errors) => {
                errors.extend(extra);
                Err(errors)
            }
        }
    }

    fn errors(&self) -> &[CompilationError] {
        match self {
            Ok(_) => &[],
            Err(errors) => errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Span;

    fn missing(name: &str) -> CompilationError {
        CompilationError::VarNotFound {
            name: name.into(),
            span: Span::default(),
        }
    }

    #[test]
    fn zip_keeps_errors_from_both_sides() {
        let a: Parsed<i32> = fail(missing("a"));
        let b: Parsed<i32> = fail(missing("b"));
        assert_eq!(zip(a, b).errors().len(), 2);
    }

    #[test]
    fn zip4_succeeds_only_when_all_succeed() {
        let ok = zip4(Ok(1), Ok('a'), Ok(true), Ok("x"));
        assert_eq!(ok, Ok((1, 'a', true, "x")));

        let bad = zip4(Ok(1), fail::<char>(missing("c")), Ok(true), fail::<&str>(missing("d")));
        assert_eq!(bad.errors().len(), 2);
    }

    #[test]
    fn collect_all_preserves_order() {
        let items = vec![Ok(1), fail(missing("x")), Ok(3), fail(missing("y"))];
        let errors = collect_all(items).unwrap_err();
        assert_eq!(errors, vec![missing("x"), missing("y")]);
    }

    #[test]
    fn validate_turns_check_into_error() {
        let checked = Ok(5).validate(|n| (*n > 3).then(|| missing("big")));
        assert_eq!(checked.errors(), &[missing("big")]);
    }

    #[test]
    fn also_fails_a_success_with_extra_errors() {
        let value: Parsed<i32> = Ok(1);
        assert!(value.clone().also(Vec::new()).is_ok());
        assert_eq!(value.also(vec![missing("z")]).errors().len(), 1);
    }
}
