//! Terminal UI components (spinner, colors, prompt helpers).

use anyhow::Result;
use inquire::InquireError;

mod spinner;
mod style;

pub use spinner::Spinner;
pub use style::Style;

const fn is_prompt_cancelled(err: &InquireError) -> bool {
    matches!(
        err,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

/// Runs an interactive prompt flow, treating Ctrl+C or Escape as a clean exit.
///
/// Returns `Ok(None)` when the user cancelled, and the flow's value otherwise.
pub fn handle_prompt_cancellation<F, R>(f: F) -> Result<Option<R>>
where
    F: FnOnce() -> Result<R>,
{
    match f() {
        Ok(value) => Ok(Some(value)),
        Err(e)
            if e.downcast_ref::<InquireError>()
                .is_some_and(is_prompt_cancelled) =>
        {
            println!();
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_prompt_returns_value() {
        let result = handle_prompt_cancellation(|| Ok("fr"));
        assert_eq!(result.ok().flatten(), Some("fr"));
    }

    #[test]
    fn test_cancelled_prompt_is_not_an_error() {
        for err in [
            InquireError::OperationCanceled,
            InquireError::OperationInterrupted,
        ] {
            let result = handle_prompt_cancellation::<_, ()>(|| Err(err.into()));
            assert!(matches!(result, Ok(None)));
        }
    }

    #[test]
    fn test_other_errors_propagate() {
        let result = handle_prompt_cancellation::<_, ()>(|| {
            Err(InquireError::Custom("broken terminal".into()).into())
        });
        let Err(err) = result else {
            panic!("expected an error");
        };
        assert!(err.to_string().contains("broken terminal"));
    }
}
