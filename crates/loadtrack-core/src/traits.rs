//! Core traits for Loadtrack.
//!
//! The primary trait is [`Operation`], the capability a
//! [`LoadingTracker`](crate::LoadingTracker) wraps: "invoked with
//! arguments, produces a deferred result".

use std::future::Future;

use futures::future::BoxFuture;

/// Boxed future returned by named [`Operation`] implementations.
pub type BoxOperationFuture<T, E> = BoxFuture<'static, std::result::Result<T, E>>;

/// An asynchronous unit of work that a tracker can wrap.
///
/// `Args` is the ordered argument sequence, expressed as a tuple (`()` for
/// no arguments, `(a,)` for one, `(a, b)` for two and so on). Invoking the
/// operation produces a future that settles with either a success value or
/// an error; the tracker is generic over both and never inspects them.
///
/// Every closure or function of the shape `Fn(Args) -> impl Future<Output =
/// Result<T, E>>` is an `Operation` through the blanket implementation
/// below, so most callers never implement this trait by hand.
///
/// # Example
///
/// ```
/// use loadtrack_core::Operation;
///
/// let fetch = |(id,): (u32,)| async move {
///     if id == 0 {
///         Err("no such project")
///     } else {
///         Ok(format!("project-{id}"))
///     }
/// };
///
/// let value = futures::executor::block_on(fetch.invoke((7,)));
/// assert_eq!(value, Ok("project-7".to_string()));
/// ```
///
/// Named types implement it directly, usually returning a
/// [`BoxOperationFuture`]:
///
/// ```
/// use futures::FutureExt;
/// use loadtrack_core::{BoxOperationFuture, Operation};
///
/// struct Always(&'static str);
///
/// impl Operation<()> for Always {
///     type Output = &'static str;
///     type Error = std::convert::Infallible;
///     type Future = BoxOperationFuture<Self::Output, Self::Error>;
///
///     fn invoke(&self, _args: ()) -> Self::Future {
///         let value = self.0;
///         async move { Ok(value) }.boxed()
///     }
/// }
///
/// let value = futures::executor::block_on(Always("ok").invoke(()));
/// assert_eq!(value, Ok("ok"));
/// ```
pub trait Operation<Args> {
    /// Success value of the deferred result.
    type Output;

    /// Failure value of the deferred result.
    type Error;

    /// The deferred result itself.
    type Future: Future<Output = std::result::Result<Self::Output, Self::Error>>;

    /// Start the operation with the given arguments.
    fn invoke(&self, args: Args) -> Self::Future;
}

impl<F, Args, Fut, T, E> Operation<Args> for F
where
    F: Fn(Args) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    type Output = T;
    type Error = E;
    type Future = Fut;

    fn invoke(&self, args: Args) -> Self::Future {
        self(args)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use futures::executor::block_on;

    async fn lookup(args: (String, usize)) -> std::result::Result<char, String> {
        let (word, index) = args;
        word.chars()
            .nth(index)
            .ok_or_else(|| format!("{word} has no index {index}"))
    }

    struct Countdown;

    impl Operation<(u8,)> for Countdown {
        type Output = u8;
        type Error = &'static str;
        type Future = BoxOperationFuture<u8, &'static str>;

        fn invoke(&self, (n,): (u8,)) -> Self::Future {
            async move { n.checked_sub(1).ok_or("already at zero") }.boxed()
        }
    }

    #[test]
    fn test_closure_is_operation() {
        let op = |(): ()| async { Ok::<_, ()>(42) };
        assert_eq!(block_on(op.invoke(())), Ok(42));
    }

    #[test]
    fn test_async_fn_is_operation() {
        assert_eq!(block_on(lookup.invoke(("rust".into(), 1))), Ok('u'));
        assert_eq!(
            block_on(lookup.invoke(("rust".into(), 9))),
            Err("rust has no index 9".to_string())
        );
    }

    #[test]
    fn test_named_operation() {
        assert_eq!(block_on(Countdown.invoke((3,))), Ok(2));
        assert_eq!(block_on(Countdown.invoke((0,))), Err("already at zero"));
    }

    #[test]
    fn test_invoke_calls_function_once() {
        let calls = std::cell::Cell::new(0);
        let op = |(): ()| {
            calls.set(calls.get() + 1);
            async { Ok::<_, ()>(()) }
        };
        let fut = op.invoke(());
        assert_eq!(calls.get(), 1);
        block_on(fut).unwrap();
        assert_eq!(calls.get(), 1);
    }
}
