/// Возвращает `Err(StackError)` из текущей функции.
///
/// `bail!(err)` принимает типизированную ошибку, `bail!(code, "fmt", ..)`
/// строит [`GenericError`](crate::GenericError) с кодом.
#[macro_export]
macro_rules! bail {
    ($err:expr) => {
        return Err($crate::StackError::from($err))
    };
    ($code:expr, $($fmt:tt)+) => {
        return Err($crate::StackError::new($crate::GenericError::new(
            $code,
            format!($($fmt)+),
        )))
    };
}

/// `bail!`, если условие ложно.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($rest:tt)+) => {
        if !($cond) {
            $crate::bail!($($rest)+);
        }
    };
}

/// Добавление шага к ошибке прямо на `Result`.
pub trait ResultExt<T> {
    fn context(
        self,
        ctx: impl Into<String>,
    ) -> crate::HookbotResult<T>;

    /// Шаг строится только при ошибке.
    fn with_context<C: Into<String>>(
        self,
        f: impl FnOnce() -> C,
    ) -> crate::HookbotResult<T>;
}

impl<T, E: Into<crate::StackError>> ResultExt<T> for Result<T, E> {
    #[track_caller]
    fn context(
        self,
        ctx: impl Into<String>,
    ) -> crate::HookbotResult<T> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(e.into().context(ctx)),
        }
    }

    #[track_caller]
    fn with_context<C: Into<String>>(
        self,
        f: impl FnOnce() -> C,
    ) -> crate::HookbotResult<T> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(e.into().context(f())),
        }
    }
}
