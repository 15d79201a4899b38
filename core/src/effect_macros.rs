//! Declarative macros for ergonomic effect construction

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use gatepass_core::async_effect;
///
/// async_effect! {
///     let outcome = gateway.validate(token).await;
///     Some(ScannerAction::ValidationCompleted { cycle, outcome })
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use gatepass_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_secs(3),
///     action: ScannerAction::ResetElapsed { cycle: 4 }
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}
