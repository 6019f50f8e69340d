//! Error macros for nbcheck

/// Return a syntax error at a token position
#[macro_export]
macro_rules! bail_syntax {
    ($pos:expr, $($arg:tt)*) => {
        return Err($crate::error::NbError::syntax($pos.line, $pos.column, format!($($arg)*)))
    };
}

/// Return an unsafe-literal error at a token position
#[macro_export]
macro_rules! bail_literal {
    ($pos:expr, $($arg:tt)*) => {
        return Err($crate::error::NbError::unsafe_literal(
            $pos.line,
            $pos.column,
            format!($($arg)*),
        ))
    };
}

/// Macro for creating usage errors
#[macro_export]
macro_rules! bail_usage {
    ($msg:expr) => {
        return Err($crate::error::NbError::UsageError($msg.to_string()))
    };
}
