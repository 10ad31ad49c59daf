/// Returns early with `$error` when `$predicate` does not hold.
///
/// ```text
/// ensure!(body_length <= max_body_bytes, ParseError::too_large_body(body_length, max_body_bytes));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
